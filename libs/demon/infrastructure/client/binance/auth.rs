//! Binance API credentials and request signing

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::ExchangeError;
use crate::infrastructure::config::ConfigError;

type HmacSha256 = Hmac<Sha256>;

pub const API_KEY_ENV: &str = "BINANCE_API_KEY";
pub const API_SECRET_ENV: &str = "BINANCE_API_SECRET";

/// Header carrying the API key on every signed request
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

#[derive(Clone)]
pub struct BinanceCredentials {
    api_key: String,
    api_secret: String,
}

impl BinanceCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::EnvVarMissing(API_KEY_ENV.to_string()))?;
        let api_secret =
            std::env::var(API_SECRET_ENV).map_err(|_| ConfigError::EnvVarMissing(API_SECRET_ENV.to_string()))?;

        Ok(Self::new(api_key, api_secret))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// HMAC-SHA256 of the query string, hex encoded
    pub fn sign(&self, query_string: &str) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| ExchangeError::Auth(format!("HMAC error: {}", e)))?;
        mac.update(query_string.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for BinanceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}
