//! Shared HTTP helpers for the Binance client

use reqwest::StatusCode;

use super::types::ApiErrorBody;
use crate::domain::ExchangeError;

/// Binance codes meaning the key, secret or signature was rejected
const AUTH_ERROR_CODES: &[i64] = &[-2014, -2015, -1022];

/// Map a failed response to an `ExchangeError`
pub fn classify_error(status: StatusCode, body: &str, context: &str) -> ExchangeError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();

    if let Some(err) = &parsed {
        if AUTH_ERROR_CODES.contains(&err.code) {
            return ExchangeError::Auth(format!("{}: {} ({})", context, err.msg, err.code));
        }
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ExchangeError::Auth(format!("{}: HTTP {} {}", context, status.as_u16(), body));
    }

    match parsed {
        Some(err) => ExchangeError::Api {
            code: err.code,
            message: format!("{}: {}", context, err.msg),
        },
        None => ExchangeError::Api {
            code: i64::from(status.as_u16()),
            message: format!("{}: {}", context, body),
        },
    }
}

/// Check if response is successful, returning the response or an error
pub async fn require_success(response: reqwest::Response, context: &str) -> Result<reqwest::Response, ExchangeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    Err(classify_error(status, &body, context))
}

/// Deserialize JSON response with proper error handling
pub async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ExchangeError> {
    response
        .json()
        .await
        .map_err(|e| ExchangeError::DeserializeFailed(e.to_string()))
}

/// Join key/value pairs into a query string
pub fn build_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Plain decimal with trailing zeros removed, for values without known precision
pub fn trim_decimal(value: f64) -> String {
    let s = format!("{:.8}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}
