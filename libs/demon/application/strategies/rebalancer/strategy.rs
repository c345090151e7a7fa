//! Rebalancer strategy - the control loop.
//!
//! One sequential task: reconcile fills, quote, send, wait, cancel, wait,
//! repeat. Everything the loop mutates (ledger, scheduler, tagger) is owned
//! here.

use std::collections::VecDeque;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::ledger::Ledger;
use super::quoter::{quote, QuoteProposal};
use super::reconciler::Reconciler;
use super::scheduler::RebalanceScheduler;
use crate::application::strategies::traits::{Strategy, StrategyContext, StrategyError, StrategyResult};
use crate::domain::{is_bot_order, DemonEvent, ExchangeError, OrderTagger, PairState, Side, Trade};
use crate::infrastructure::config::DemonConfig;

/// Number of applied fills kept for the status log
const RECENT_TRADES: usize = 3;

/// Where the loop is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Init,
    QuoteCycle,
    SendWait,
    CancelWait,
}

impl LoopPhase {
    pub fn next(self) -> Self {
        match self {
            LoopPhase::Init => LoopPhase::QuoteCycle,
            LoopPhase::QuoteCycle => LoopPhase::SendWait,
            LoopPhase::SendWait => LoopPhase::CancelWait,
            LoopPhase::CancelWait => LoopPhase::QuoteCycle,
        }
    }
}

/// Summary of one quote sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub special_orders: bool,
    pub symbols_quoted: usize,
    pub orders_submitted: usize,
    pub market_hits: usize,
    pub symbols_skipped: usize,
    pub trades_applied: usize,
}

pub struct RebalancerStrategy {
    config: DemonConfig,
    ledger: Ledger,
    scheduler: RebalanceScheduler,
    tagger: OrderTagger,
    phase: LoopPhase,
    first_cycle: bool,
    recent_trades: VecDeque<Trade>,
}

impl RebalancerStrategy {
    pub fn new(config: DemonConfig) -> Self {
        let scheduler = RebalanceScheduler::new(config.rebalance_interval());
        Self {
            config,
            ledger: Ledger::default(),
            scheduler,
            tagger: OrderTagger::new(),
            phase: LoopPhase::Init,
            first_cycle: true,
            recent_trades: VecDeque::with_capacity(RECENT_TRADES),
        }
    }

    /// Replace the scheduler, e.g. to control its start instant
    pub fn with_scheduler(mut self, scheduler: RebalanceScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn scheduler(&self) -> &RebalanceScheduler {
        &self.scheduler
    }

    /// Most recent applied fills, oldest first
    pub fn recent_trades(&self) -> impl Iterator<Item = &Trade> {
        self.recent_trades.iter()
    }

    /// Saved balances and cursor win; skews always come from config.
    fn merge_state(&self, saved: Vec<PairState>) -> Vec<PairState> {
        for stale in saved.iter().filter(|s| !self.config.pairs.iter().any(|p| p.symbol == s.symbol)) {
            warn!("[Demon] Ignoring saved state for unconfigured pair {}", stale.symbol);
        }

        self.config
            .pairs
            .iter()
            .map(|pc| match saved.iter().find(|s| s.symbol == pc.symbol) {
                Some(s) => {
                    let mut pair = s.clone();
                    pair.buy_skew = pc.buy_skew;
                    pair.sell_skew = pc.sell_skew;
                    pair
                }
                None => {
                    info!("[Demon] {} has no saved state, seeding from config", pc.symbol);
                    pc.initial_state()
                }
            })
            .collect()
    }

    /// Cancel every open order carrying the bot prefix.
    ///
    /// Non-auth failures are logged and the remaining symbols still get
    /// cancelled. An auth failure aborts and is returned.
    pub async fn cancel_bot_orders(&self, ctx: &StrategyContext) -> Result<usize, ExchangeError> {
        let mut cancelled = 0;

        for symbol in self.ledger.symbols() {
            let orders = match ctx.exchange.get_open_orders(&symbol).await {
                Ok(orders) => orders,
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    ctx.sink.notify(&DemonEvent::error(Some(&symbol), e.to_string()));
                    continue;
                }
            };

            for order in orders.iter().filter(|o| is_bot_order(&o.client_order_id)) {
                match ctx.exchange.cancel_order(&symbol, order.order_id).await {
                    Ok(()) => {
                        debug!("[Demon] {}: cancelled {} ({})", symbol, order.order_id, order.client_order_id);
                        cancelled += 1;
                    }
                    Err(e) if e.is_auth() => return Err(e),
                    Err(e) => {
                        ctx.sink.notify(&DemonEvent::error(Some(&symbol), e.to_string()));
                    }
                }
            }
        }

        if cancelled > 0 {
            info!("[Demon] Cancelled {} bot orders", cancelled);
        }
        Ok(cancelled)
    }

    /// One full sweep over every symbol.
    ///
    /// Per-symbol problems are logged and skipped. The only error returned
    /// is the optional first-cycle market-hit halt.
    pub async fn run_cycle(&mut self, ctx: &StrategyContext) -> StrategyResult<CycleReport> {
        let special_orders = self.scheduler.check(Instant::now());
        let mut report = CycleReport {
            special_orders,
            ..CycleReport::default()
        };

        if special_orders {
            info!("[Demon] Special orders active for this sweep");
        }

        for symbol in self.ledger.symbols() {
            if !ctx.is_running() {
                break;
            }
            self.quote_symbol(ctx, &symbol, special_orders, &mut report).await?;
        }

        self.scheduler.complete_sweep();
        self.first_cycle = false;
        self.log_recent_trades();

        Ok(report)
    }

    async fn quote_symbol(
        &mut self,
        ctx: &StrategyContext,
        symbol: &str,
        special_orders: bool,
        report: &mut CycleReport,
    ) -> StrategyResult<()> {
        let reconciler = Reconciler::new(ctx.exchange.as_ref(), ctx.store.as_ref(), ctx.sink.as_ref());
        match reconciler.reconcile(&mut self.ledger, symbol).await {
            Ok(applied) => {
                report.trades_applied += applied.len();
                for trade in applied {
                    if self.recent_trades.len() == RECENT_TRADES {
                        self.recent_trades.pop_front();
                    }
                    self.recent_trades.push_back(trade);
                }
            }
            // Quote from the last committed ledger
            Err(e) => {
                ctx.sink.notify(&DemonEvent::error(Some(symbol), e.to_string()));
            }
        }

        let market = match ctx.exchange.get_market_price(symbol).await {
            Ok(market) => market,
            Err(e) => {
                ctx.sink.notify(&DemonEvent::error(Some(symbol), e.to_string()));
                report.symbols_skipped += 1;
                return Ok(());
            }
        };

        let Some(pair) = self.ledger.get(symbol) else {
            report.symbols_skipped += 1;
            return Ok(());
        };

        let proposal = match quote(pair, &market, special_orders) {
            Ok(proposal) => proposal,
            Err(e) => {
                ctx.sink.notify(&DemonEvent::error(Some(symbol), e.to_string()));
                report.symbols_skipped += 1;
                return Ok(());
            }
        };

        debug!(
            "[Demon] {}: fair {} mid {} ({}) skews {}/{}",
            symbol,
            proposal.fair_price,
            proposal.mid_price,
            proposal.distance_display(),
            proposal.bid_skew,
            proposal.ask_skew
        );

        if proposal.market_hit {
            report.market_hits += 1;
            ctx.sink.notify(&DemonEvent::MarketHitWarning {
                symbol: symbol.to_string(),
                mid_price: proposal.mid_price,
                target_bid: proposal.target_bid,
                target_ask: proposal.target_ask,
            });
            if self.first_cycle && self.config.halt_on_first_cycle_market_hit {
                return Err(StrategyError::MarketHitOnStartup(symbol.to_string()));
            }
            return Ok(());
        }

        report.symbols_quoted += 1;
        for side in [Side::Buy, Side::Sell] {
            if self.send_side(ctx, &proposal, side).await {
                report.orders_submitted += 1;
            }
        }

        Ok(())
    }

    /// Returns true when an order actually reached the exchange
    async fn send_side(&mut self, ctx: &StrategyContext, proposal: &QuoteProposal, side: Side) -> bool {
        let symbol = proposal.symbol.as_str();
        let Some(meta) = self.ledger.get(symbol).map(|p| p.metadata.clone()) else {
            return false;
        };

        let order = proposal.order(side, &mut self.tagger);
        if order.qty <= 0.0 {
            warn!("[Demon] {}: {} quantity {} is not positive, skipping", symbol, side, order.qty);
            return false;
        }
        if !meta.meets_min_notional(order.price, order.qty) {
            warn!(
                "[Demon] {}: {} notional {} below exchange minimum, skipping",
                symbol,
                side,
                order.notional()
            );
            return false;
        }

        let dry_run = !self.config.is_trading();
        if !dry_run {
            if let Err(e) = ctx.exchange.submit_limit_order(&order).await {
                ctx.sink.notify(&DemonEvent::error(Some(symbol), format!("{} order rejected: {}", side, e)));
                return false;
            }
        }

        ctx.sink.notify(&DemonEvent::QuoteSubmitted {
            symbol: symbol.to_string(),
            side,
            price: order.price,
            qty: order.qty,
            mid_price: proposal.mid_price,
            distance: proposal.distance_display(),
            client_tag: order.client_tag.clone(),
            dry_run,
        });

        !dry_run
    }

    fn log_recent_trades(&self) {
        if self.recent_trades.is_empty() {
            return;
        }
        info!("[Demon] Last trades:");
        for trade in self.recent_trades.iter().rev() {
            info!(
                "[Demon]   {} {} @ {} id {} ({})",
                trade.side(),
                trade.base_qty,
                trade.price,
                trade.id,
                trade.time.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    fn log_report(report: &CycleReport) {
        info!(
            quoted = report.symbols_quoted,
            submitted = report.orders_submitted,
            market_hits = report.market_hits,
            skipped = report.symbols_skipped,
            trades = report.trades_applied,
            special = report.special_orders,
            "[Demon] Quote cycle complete"
        );
    }
}

#[async_trait]
impl Strategy for RebalancerStrategy {
    fn name(&self) -> &str {
        "shannons_demon"
    }

    fn description(&self) -> &str {
        "Keeps base and quote inventory at equal value by quoting around fair price"
    }

    async fn initialize(&mut self, ctx: &StrategyContext) -> StrategyResult<()> {
        info!(
            pairs = self.config.pairs.len(),
            mode = %self.config.mode,
            "[Demon] Initializing"
        );

        let saved = ctx.store.load_state()?.unwrap_or_default();
        self.ledger = Ledger::new(self.merge_state(saved));

        for symbol in self.ledger.symbols() {
            let metadata = ctx.exchange.get_pair_metadata(&symbol).await?;
            if !metadata.is_valid() {
                return Err(StrategyError::Config(format!(
                    "{} has unusable tick size {} / step size {}",
                    symbol, metadata.tick_size, metadata.step_size
                )));
            }
            debug!(
                "[Demon] {}: tick {} step {} min notional {:?}",
                symbol, metadata.tick_size, metadata.step_size, metadata.min_notional
            );
            self.ledger.set_metadata(&symbol, metadata)?;
        }

        ctx.store.save_state(self.ledger.pairs())?;

        for pair in self.ledger.pairs() {
            info!(
                "[Demon] {}: base {} quote {} skews {}/{} cursor {}",
                pair.symbol, pair.base_qty, pair.quote_qty, pair.buy_skew, pair.sell_skew, pair.last_applied_trade_id
            );
        }

        // Leftovers from a previous run
        self.cancel_bot_orders(ctx).await?;

        self.phase = LoopPhase::QuoteCycle;
        Ok(())
    }

    async fn start(&mut self, ctx: &StrategyContext) -> StrategyResult<()> {
        info!("[Demon] Starting control loop");

        while ctx.is_running() {
            match self.phase {
                LoopPhase::Init => {
                    return Err(StrategyError::Config("start() called before initialize()".to_string()));
                }
                LoopPhase::QuoteCycle => {
                    let report = self.run_cycle(ctx).await?;
                    Self::log_report(&report);
                }
                LoopPhase::SendWait => {
                    ctx.shutdown.interruptible_sleep(self.config.send_delay()).await;
                }
                LoopPhase::CancelWait => {
                    if let Err(e) = self.cancel_bot_orders(ctx).await {
                        ctx.sink.notify(&DemonEvent::error(None, e.to_string()));
                    }
                    ctx.shutdown.interruptible_sleep(self.config.cancel_delay()).await;
                }
            }
            self.phase = self.phase.next();
        }

        info!("[Demon] Control loop ended (shutdown requested)");
        Ok(())
    }

    async fn stop(&mut self, ctx: &StrategyContext) -> StrategyResult<()> {
        info!("[Demon] Stopping, cancelling open bot orders");
        if let Err(e) = self.cancel_bot_orders(ctx).await {
            warn!("[Demon] Failed to cancel orders on shutdown: {}", e);
        }
        Ok(())
    }
}
