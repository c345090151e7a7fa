//! Quote engine - pure function from inventory and top of book to a
//! two-sided order proposal.
//!
//! Fair price is the quote value held per unit of base. Both quotes are
//! placed a skew away from fair price, with quantities chosen so that a fill
//! brings base and quote value back to a 50/50 split at the traded price.

use thiserror::Error;

use crate::domain::{LimitOrder, MarketPrice, OrderTagger, PairState, Side};

/// Bid skew never exceeds this fraction of fair price
pub const MAX_BID_SKEW: f64 = 0.95;

/// Ask skew never drops below this multiple of fair price
pub const MIN_ASK_SKEW: f64 = 1.05;

/// Distance from fair price at which special orders ride the drift
pub const DRIFT_THRESHOLD: f64 = 0.05;

/// Mid below this fraction of the target bid means the bid would cross
const MARKET_HIT_BID_BAND: f64 = 0.99;

/// Mid above this multiple of the target ask means the ask would cross
const MARKET_HIT_ASK_BAND: f64 = 1.01;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("Invalid inventory for {symbol}: base {base_qty}, quote {quote_qty}")]
    InvalidInventory {
        symbol: String,
        base_qty: f64,
        quote_qty: f64,
    },

    #[error("Invalid market for {symbol}: bid {bid_price}, ask {ask_price}")]
    InvalidMarket {
        symbol: String,
        bid_price: f64,
        ask_price: f64,
    },
}

/// Two-sided order proposal for one symbol. Recomputed every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteProposal {
    pub symbol: String,
    pub fair_price: f64,
    pub mid_price: f64,
    /// (mid - fair) / fair
    pub away_from_mid: f64,
    pub bid_skew: f64,
    pub ask_skew: f64,
    pub target_bid: f64,
    pub target_ask: f64,
    pub bid_price: f64,
    pub bid_qty: f64,
    pub ask_price: f64,
    pub ask_qty: f64,
    /// Quoting would trade through the market; do not submit
    pub market_hit: bool,
}

impl QuoteProposal {
    /// Display-only distance of mid from fair price, e.g. "+1.5%"
    pub fn distance_display(&self) -> String {
        format!("{:+.1}%", 100.0 * self.away_from_mid)
    }

    /// Build the limit order for one side with a fresh client tag
    pub fn order(&self, side: Side, tagger: &mut OrderTagger) -> LimitOrder {
        let (price, qty) = match side {
            Side::Buy => (self.bid_price, self.bid_qty),
            Side::Sell => (self.ask_price, self.ask_qty),
        };
        let tag = tagger.next_tag(side, &self.symbol);
        LimitOrder::new(self.symbol.clone(), side, price, qty, tag)
    }
}

/// Pick bid/ask skews.
///
/// Branch order matters: a drift of exactly +5% takes the first branch.
/// Always returns `bid <= MAX_BID_SKEW < MIN_ASK_SKEW <= ask`.
pub fn select_skews(buy_skew: f64, sell_skew: f64, away_from_mid: f64, special_orders: bool) -> (f64, f64) {
    if special_orders && away_from_mid >= DRIFT_THRESHOLD {
        (buy_skew.min(MAX_BID_SKEW), (1.0 + away_from_mid).max(MIN_ASK_SKEW))
    } else if special_orders && away_from_mid <= -DRIFT_THRESHOLD {
        ((1.0 + away_from_mid).min(MAX_BID_SKEW), sell_skew.max(MIN_ASK_SKEW))
    } else {
        (buy_skew.min(MAX_BID_SKEW), sell_skew.max(MIN_ASK_SKEW))
    }
}

/// Compute the two-sided proposal for a pair.
pub fn quote(pair: &PairState, market: &MarketPrice, special_orders: bool) -> Result<QuoteProposal, QuoteError> {
    let fair_price = pair.fair_price().ok_or_else(|| QuoteError::InvalidInventory {
        symbol: pair.symbol.clone(),
        base_qty: pair.base_qty,
        quote_qty: pair.quote_qty,
    })?;

    if !market.is_valid() {
        return Err(QuoteError::InvalidMarket {
            symbol: pair.symbol.clone(),
            bid_price: market.bid_price,
            ask_price: market.ask_price,
        });
    }

    let meta = &pair.metadata;
    let mid_price = meta.round_price(0.5 * (market.bid_price + market.ask_price));
    let away_from_mid = (mid_price - fair_price) / fair_price;

    let (bid_skew, ask_skew) = select_skews(pair.buy_skew, pair.sell_skew, away_from_mid, special_orders);

    let target_bid = bid_skew * fair_price;
    let target_ask = ask_skew * fair_price;

    // Never rest deeper than one tick inside the current book
    let bid_price = meta.round_price(target_bid.min(market.bid_price + meta.tick_size));
    let ask_price = meta.round_price(target_ask.max(market.ask_price - meta.tick_size));

    let base = pair.base_qty;
    let cash = pair.quote_qty;
    let bid_qty = meta.round_qty(0.5 * (cash - base * bid_price) / bid_price);
    let ask_qty = meta.round_qty(0.5 * (base * ask_price - cash) / ask_price);

    let market_hit = mid_price < MARKET_HIT_BID_BAND * target_bid || mid_price > MARKET_HIT_ASK_BAND * target_ask;

    Ok(QuoteProposal {
        symbol: pair.symbol.clone(),
        fair_price,
        mid_price,
        away_from_mid,
        bid_skew,
        ask_skew,
        target_bid,
        target_ask,
        bid_price,
        bid_qty,
        ask_price,
        ask_qty,
        market_hit,
    })
}
