//! Binance REST response bodies
//!
//! Binance sends decimals as JSON strings; they are parsed to `f64` here.

use serde::{Deserialize, Deserializer};

fn string_as_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}

/// `{code, msg}` error body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

/// GET /api/v3/ticker/bookTicker
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicker {
    pub symbol: String,
    #[serde(deserialize_with = "string_as_f64")]
    pub bid_price: f64,
    #[serde(deserialize_with = "string_as_f64")]
    pub ask_price: f64,
}

/// GET /api/v3/exchangeInfo
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER")]
    Price {
        #[serde(rename = "tickSize", deserialize_with = "string_as_f64")]
        tick_size: f64,
    },
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "stepSize", deserialize_with = "string_as_f64")]
        step_size: f64,
    },
    #[serde(rename = "MIN_NOTIONAL", alias = "NOTIONAL")]
    MinNotional {
        #[serde(rename = "minNotional", deserialize_with = "string_as_f64")]
        min_notional: f64,
    },
    #[serde(other)]
    Other,
}

impl SymbolInfo {
    pub fn tick_size(&self) -> Option<f64> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::Price { tick_size } => Some(*tick_size),
            _ => None,
        })
    }

    pub fn step_size(&self) -> Option<f64> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::LotSize { step_size } => Some(*step_size),
            _ => None,
        })
    }

    pub fn min_notional(&self) -> Option<f64> {
        self.filters.iter().find_map(|f| match f {
            SymbolFilter::MinNotional { min_notional } => Some(*min_notional),
            _ => None,
        })
    }
}

/// GET /api/v3/myTrades entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTrade {
    pub id: u64,
    pub order_id: u64,
    #[serde(deserialize_with = "string_as_f64")]
    pub price: f64,
    #[serde(deserialize_with = "string_as_f64")]
    pub qty: f64,
    #[serde(deserialize_with = "string_as_f64")]
    pub quote_qty: f64,
    /// Milliseconds since the Unix epoch
    pub time: i64,
    pub is_buyer: bool,
}

/// GET /api/v3/order and /api/v3/openOrders entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub order_id: u64,
    pub client_order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book_ticker() {
        let json = r#"{"symbol":"BTCUSDT","bidPrice":"30000.01000000","bidQty":"1.5","askPrice":"30000.02000000","askQty":"2.0"}"#;
        let ticker: BookTicker = serde_json::from_str(json).unwrap();
        assert_eq!(ticker.bid_price, 30000.01);
        assert_eq!(ticker.ask_price, 30000.02);
    }

    #[test]
    fn test_parse_symbol_filters() {
        let json = r#"{
            "symbols": [{
                "symbol": "ETHBTC",
                "status": "TRADING",
                "filters": [
                    {"filterType":"PRICE_FILTER","minPrice":"0.00000100","maxPrice":"922327.00000000","tickSize":"0.00000100"},
                    {"filterType":"LOT_SIZE","minQty":"0.00010000","maxQty":"100000.00000000","stepSize":"0.00010000"},
                    {"filterType":"ICEBERG_PARTS","limit":10},
                    {"filterType":"NOTIONAL","minNotional":"0.00010000","applyMinToMarket":true}
                ]
            }]
        }"#;
        let info: ExchangeInfo = serde_json::from_str(json).unwrap();
        let symbol = &info.symbols[0];

        assert_eq!(symbol.tick_size(), Some(0.000001));
        assert_eq!(symbol.step_size(), Some(0.0001));
        assert_eq!(symbol.min_notional(), Some(0.0001));
    }

    #[test]
    fn test_parse_account_trade() {
        let json = r#"{"symbol":"BNBBTC","id":28457,"orderId":100234,"orderListId":-1,"price":"4.00000100","qty":"12.00000000","quoteQty":"48.000012","commission":"10.10000000","commissionAsset":"BNB","time":1499865549590,"isBuyer":true,"isMaker":false,"isBestMatch":true}"#;
        let trade: AccountTrade = serde_json::from_str(json).unwrap();

        assert_eq!(trade.id, 28457);
        assert_eq!(trade.order_id, 100234);
        assert_eq!(trade.qty, 12.0);
        assert_eq!(trade.quote_qty, 48.000012);
        assert!(trade.is_buyer);
    }
}
