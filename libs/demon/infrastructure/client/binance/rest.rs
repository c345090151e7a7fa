//! Binance spot REST client

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::{Client, Method};
use tracing::{debug, info};

use super::auth::{BinanceCredentials, API_KEY_HEADER};
use super::helpers::{build_query, parse_json, require_success, trim_decimal};
use super::types::{AccountTrade, BookTicker, ExchangeInfo, OrderInfo};
use crate::domain::{ExchangeClient, ExchangeError, LimitOrder, MarketPrice, OpenOrder, PairMetadata, Trade};
use crate::infrastructure::config::ExchangeConfig;

/// Largest page /api/v3/myTrades returns
const TRADES_PAGE_LIMIT: usize = 1000;

type Result<T> = std::result::Result<T, ExchangeError>;

pub struct BinanceClient {
    base_url: String,
    client: Client,
    credentials: BinanceCredentials,
    recv_window_ms: u64,
    /// Filled by `get_pair_metadata`, used to format order decimals
    metadata: RwLock<HashMap<String, PairMetadata>>,
}

impl BinanceClient {
    pub fn new(config: &ExchangeConfig, credentials: BinanceCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .build()?;

        info!("[Binance] Using {}", config.base_url);

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            credentials,
            recv_window_ms: config.recv_window_ms,
            metadata: RwLock::new(HashMap::new()),
        })
    }

    async fn public_get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &str, context: &str) -> Result<T> {
        let url = format!("{}{}?{}", self.base_url, path, query);
        debug!("[Binance] GET {}", url);

        let response = self.client.get(&url).send().await?;
        let response = require_success(response, context).await?;
        parse_json(response).await
    }

    /// Send a request signed with HMAC-SHA256 over the full query string
    async fn signed(&self, method: Method, path: &str, params: &[(&str, String)], context: &str) -> Result<reqwest::Response> {
        let mut all: Vec<(&str, String)> = params.to_vec();
        all.push(("recvWindow", self.recv_window_ms.to_string()));
        all.push(("timestamp", Utc::now().timestamp_millis().to_string()));

        let query = build_query(&all);
        let signature = self.credentials.sign(&query)?;
        let url = format!("{}{}?{}&signature={}", self.base_url, path, query, signature);
        debug!("[Binance] {} {}{}", method, path, context_suffix(params));

        let response = self
            .client
            .request(method, &url)
            .header(API_KEY_HEADER, self.credentials.api_key())
            .send()
            .await?;
        require_success(response, context).await
    }

    async fn fetch_trade_page(&self, symbol: &str, from_id: u64) -> Result<Vec<AccountTrade>> {
        let params = [
            ("symbol", symbol.to_string()),
            ("fromId", from_id.to_string()),
            ("limit", TRADES_PAGE_LIMIT.to_string()),
        ];
        let response = self.signed(Method::GET, "/api/v3/myTrades", &params, "Failed to fetch trades").await?;
        parse_json(response).await
    }

    async fn fetch_client_order_id(&self, symbol: &str, order_id: u64) -> Result<String> {
        let params = [("symbol", symbol.to_string()), ("orderId", order_id.to_string())];
        let response = self.signed(Method::GET, "/api/v3/order", &params, "Failed to look up order").await?;
        let order: OrderInfo = parse_json(response).await?;
        Ok(order.client_order_id)
    }

    fn format_order(&self, order: &LimitOrder) -> (String, String) {
        match self.metadata.read().get(&order.symbol) {
            Some(meta) => (meta.format_price(order.price), meta.format_qty(order.qty)),
            None => (trim_decimal(order.price), trim_decimal(order.qty)),
        }
    }
}

fn context_suffix(params: &[(&str, String)]) -> String {
    params
        .iter()
        .find(|(k, _)| *k == "symbol")
        .map(|(_, v)| format!(" [{}]", v))
        .unwrap_or_default()
}

fn to_trade(raw: AccountTrade, client_order_id: String) -> Trade {
    Trade {
        id: raw.id,
        order_id: raw.order_id,
        client_order_id,
        is_buyer: raw.is_buyer,
        price: raw.price,
        base_qty: raw.qty,
        quote_qty: raw.quote_qty,
        time: DateTime::<Utc>::from_timestamp_millis(raw.time).unwrap_or_default(),
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn get_market_price(&self, symbol: &str) -> Result<MarketPrice> {
        let ticker: BookTicker = self
            .public_get(
                "/api/v3/ticker/bookTicker",
                &format!("symbol={}", symbol),
                "Failed to fetch book ticker",
            )
            .await?;
        Ok(MarketPrice::new(ticker.bid_price, ticker.ask_price))
    }

    async fn get_new_trades(&self, symbol: &str, since_id: u64) -> Result<Vec<Trade>> {
        let mut trades = Vec::new();
        // Client ids looked up during this call, keyed by order id
        let mut client_ids: HashMap<u64, String> = HashMap::new();
        let mut from_id = since_id + 1;

        loop {
            let page = self.fetch_trade_page(symbol, from_id).await?;
            let page_len = page.len();

            for raw in page {
                let client_order_id = match client_ids.get(&raw.order_id) {
                    Some(id) => id.clone(),
                    None => {
                        let id = self.fetch_client_order_id(symbol, raw.order_id).await?;
                        client_ids.insert(raw.order_id, id.clone());
                        id
                    }
                };
                from_id = from_id.max(raw.id + 1);
                trades.push(to_trade(raw, client_order_id));
            }

            if page_len < TRADES_PAGE_LIMIT {
                break;
            }
        }

        trades.sort_by_key(|t| t.id);
        debug!("[Binance] {}: {} trades after id {}", symbol, trades.len(), since_id);
        Ok(trades)
    }

    async fn get_pair_metadata(&self, symbol: &str) -> Result<PairMetadata> {
        let info: ExchangeInfo = self
            .public_get(
                "/api/v3/exchangeInfo",
                &format!("symbol={}", symbol),
                "Failed to fetch exchange info",
            )
            .await?;

        let symbol_info = info
            .symbols
            .into_iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| ExchangeError::UnknownSymbol(symbol.to_string()))?;

        let tick_size = symbol_info
            .tick_size()
            .ok_or_else(|| ExchangeError::DeserializeFailed(format!("{} has no PRICE_FILTER", symbol)))?;
        let step_size = symbol_info
            .step_size()
            .ok_or_else(|| ExchangeError::DeserializeFailed(format!("{} has no LOT_SIZE", symbol)))?;

        let mut metadata = PairMetadata::new(tick_size, step_size);
        if let Some(min_notional) = symbol_info.min_notional() {
            metadata = metadata.with_min_notional(min_notional);
        }

        self.metadata.write().insert(symbol.to_string(), metadata.clone());
        Ok(metadata)
    }

    async fn get_open_orders(&self, symbol: &str) -> Result<Vec<OpenOrder>> {
        let params = [("symbol", symbol.to_string())];
        let response = self
            .signed(Method::GET, "/api/v3/openOrders", &params, "Failed to fetch open orders")
            .await?;
        let orders: Vec<OrderInfo> = parse_json(response).await?;

        Ok(orders
            .into_iter()
            .map(|o| OpenOrder {
                order_id: o.order_id,
                client_order_id: o.client_order_id,
            })
            .collect())
    }

    async fn cancel_order(&self, symbol: &str, order_id: u64) -> Result<()> {
        let params = [("symbol", symbol.to_string()), ("orderId", order_id.to_string())];
        self.signed(Method::DELETE, "/api/v3/order", &params, "Failed to cancel order")
            .await?;
        Ok(())
    }

    async fn submit_limit_order(&self, order: &LimitOrder) -> Result<()> {
        let (price, quantity) = self.format_order(order);
        let params = [
            ("symbol", order.symbol.clone()),
            ("side", order.side.as_str().to_string()),
            ("type", "LIMIT".to_string()),
            ("timeInForce", "GTC".to_string()),
            ("quantity", quantity),
            ("price", price),
            ("newClientOrderId", order.client_tag.clone()),
        ];
        self.signed(Method::POST, "/api/v3/order", &params, "Failed to submit order")
            .await?;
        Ok(())
    }
}
