//! Configuration loading and representation.

use std::net::SocketAddr;

use rust_decimal::Decimal;
use thiserror::Error;

use tradeerp_core::Currency;
use tradeerp_observability::LogFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Application settings, read from `TRADEERP_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    /// Days from PO confirmation (or invoice issue) to due date.
    pub payment_terms_days: u32,
    /// VAT rate applied to tax invoices (e.g. `0.10`).
    pub tax_rate: Decimal,
    pub default_currency: Currency,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_format: LogFormat::Json,
            payment_terms_days: 30,
            tax_rate: Decimal::new(10, 2),
            default_currency: Currency::krw(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("TRADEERP_BIND_ADDR") {
            cfg.bind_addr = parse("TRADEERP_BIND_ADDR", &v)?;
        }
        if let Some(v) = lookup("TRADEERP_LOG_FORMAT") {
            cfg.log_format = parse("TRADEERP_LOG_FORMAT", &v)?;
        }
        if let Some(v) = lookup("TRADEERP_PAYMENT_TERMS_DAYS") {
            cfg.payment_terms_days = parse("TRADEERP_PAYMENT_TERMS_DAYS", &v)?;
        }
        if let Some(v) = lookup("TRADEERP_TAX_RATE") {
            let rate: Decimal = parse("TRADEERP_TAX_RATE", &v)?;
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(ConfigError::Invalid {
                    var: "TRADEERP_TAX_RATE",
                    value: v,
                    reason: "must be in [0, 1)".to_string(),
                });
            }
            cfg.tax_rate = rate;
        }
        if let Some(v) = lookup("TRADEERP_DEFAULT_CURRENCY") {
            cfg.default_currency = parse("TRADEERP_DEFAULT_CURRENCY", &v)?;
        }

        Ok(cfg)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = from(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.payment_terms_days, 30);
        assert_eq!(cfg.tax_rate, Decimal::new(10, 2));
        assert_eq!(cfg.default_currency.as_str(), "KRW");
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = from(&[
            ("TRADEERP_BIND_ADDR", "127.0.0.1:9000"),
            ("TRADEERP_LOG_FORMAT", "pretty"),
            ("TRADEERP_PAYMENT_TERMS_DAYS", "45"),
            ("TRADEERP_TAX_RATE", "0.07"),
            ("TRADEERP_DEFAULT_CURRENCY", "usd"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.payment_terms_days, 45);
        assert_eq!(cfg.tax_rate, Decimal::new(7, 2));
        assert_eq!(cfg.default_currency.as_str(), "USD");
    }

    #[test]
    fn bad_values_name_the_variable() {
        match from(&[("TRADEERP_PAYMENT_TERMS_DAYS", "-1")]) {
            Err(ConfigError::Invalid { var, .. }) => assert_eq!(var, "TRADEERP_PAYMENT_TERMS_DAYS"),
            other => panic!("Expected invalid payment terms, got {other:?}"),
        }
        assert!(from(&[("TRADEERP_TAX_RATE", "1.5")]).is_err());
        assert!(from(&[("TRADEERP_DEFAULT_CURRENCY", "EURO")]).is_err());
    }
}
