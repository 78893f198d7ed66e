//! Application configuration loaded from environment variables.

use std::time::Duration;

use cart::Money;
use checkout::CheckoutSettings;
use thiserror::Error;

/// Largest Cash on Delivery limit whose paise amount still fits in `i64`.
pub const MAX_COD_LIMIT_RUPEES: i64 = i64::MAX / 100;

/// A configuration variable that is set but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `json` for JSON log lines, anything else for plain text
/// - `CART_SERVICE_URL`: storefront backend base URL; unset means a seeded in-memory cart
/// - `CART_SESSION_COOKIE`: `Cookie` header sent to the backend
/// - `PAYMENT_DELAY_MS`: simulated payment delay (default: `2000`)
/// - `COD_LIMIT_RUPEES`: Cash on Delivery limit, `0..=MAX_COD_LIMIT_RUPEES` (default: `5000`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub cart_service_url: Option<String>,
    pub cart_session_cookie: Option<String>,
    pub payment_delay: Duration,
    pub cod_limit_rupees: i64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a numeric variable is set but does not parse,
    /// or when `COD_LIMIT_RUPEES` is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT")?.unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.trim().eq_ignore_ascii_case("json")),
            cart_service_url: non_empty("CART_SERVICE_URL"),
            cart_session_cookie: non_empty("CART_SESSION_COOKIE"),
            payment_delay: parse(&lookup, "PAYMENT_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.payment_delay),
            cod_limit_rupees: parse_in_range(&lookup, "COD_LIMIT_RUPEES", 0..=MAX_COD_LIMIT_RUPEES)?
                .unwrap_or(defaults.cod_limit_rupees),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checkout settings derived from this configuration.
    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings::default()
            .with_cod_limit(Money::from_rupees(self.cod_limit_rupees))
            .with_payment_delay(self.payment_delay)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError { name, value })
        })
        .transpose()
}

fn parse_in_range<T: std::str::FromStr + PartialOrd>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    range: std::ops::RangeInclusive<T>,
) -> Result<Option<T>, ConfigError> {
    match parse::<T>(lookup, name)? {
        Some(value) if !range.contains(&value) => Err(ConfigError {
            name,
            value: lookup(name).unwrap_or_default(),
        }),
        parsed => Ok(parsed),
    }
}

impl Default for Config {
    fn default() -> Self {
        let checkout = CheckoutSettings::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_json: false,
            cart_service_url: None,
            cart_session_cookie: None,
            payment_delay: checkout.payment_delay,
            cod_limit_rupees: checkout.cod_limit.rupees(),
        }
    }
}
