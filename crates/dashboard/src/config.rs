use thiserror::Error;

use saledash_core::UserId;

/// Channel every sale update is published on.
pub const DEFAULT_CHANNEL: &str = "handle_sale_update";

/// Message type of sale update notifications.
pub const MESSAGE_TYPE: &str = "notification";

/// Session field carrying the requesting user's id.
pub const CURRENT_USER_FIELD: &str = "current_user";

/// User id the host assigns to unauthenticated requests.
pub const DEFAULT_PUBLIC_USER: UserId = UserId::new(4);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Module settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub channel: String,
    pub public_user: UserId,
    /// Upper bound on orders read per dashboard load.
    pub search_limit: usize,
    pub trend_window_days: u32,
    pub trend_points: usize,
    pub top_categories: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            public_user: DEFAULT_PUBLIC_USER,
            search_limit: 1000,
            trend_window_days: 30,
            trend_points: 7,
            top_categories: 5,
        }
    }
}

impl DashboardConfig {
    /// Read `SALEDASH_*` variables; unset ones keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(channel) = lookup("SALEDASH_CHANNEL") {
            let channel = channel.trim();
            if channel.is_empty() {
                return Err(ConfigError {
                    var: "SALEDASH_CHANNEL",
                    value: channel.to_string(),
                });
            }
            cfg.channel = channel.to_string();
        }

        if let Some(raw) = lookup("SALEDASH_PUBLIC_USER_ID") {
            cfg.public_user = raw.parse().map_err(|_| ConfigError {
                var: "SALEDASH_PUBLIC_USER_ID",
                value: raw.clone(),
            })?;
        }

        cfg.search_limit = parse_positive(&lookup, "SALEDASH_SEARCH_LIMIT", cfg.search_limit)?;
        cfg.trend_window_days =
            parse_positive(&lookup, "SALEDASH_TREND_WINDOW_DAYS", cfg.trend_window_days)?;
        cfg.trend_points = parse_positive(&lookup, "SALEDASH_TREND_POINTS", cfg.trend_points)?;
        cfg.top_categories = parse_positive(&lookup, "SALEDASH_TOP_CATEGORIES", cfg.top_categories)?;

        Ok(cfg)
    }
}

fn parse_positive<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(ConfigError { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.channel, "handle_sale_update");
        assert_eq!(cfg.public_user, UserId::new(4));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            ("SALEDASH_CHANNEL", "sales_live"),
            ("SALEDASH_PUBLIC_USER_ID", "3"),
            ("SALEDASH_TREND_POINTS", "14"),
        ]))
        .unwrap();

        assert_eq!(cfg.channel, "sales_live");
        assert_eq!(cfg.public_user, UserId::new(3));
        assert_eq!(cfg.trend_points, 14);
        assert_eq!(cfg.search_limit, 1000);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let err = DashboardConfig::from_lookup(lookup(&[("SALEDASH_SEARCH_LIMIT", "0")])).unwrap_err();
        assert_eq!(err.var, "SALEDASH_SEARCH_LIMIT");

        assert!(DashboardConfig::from_lookup(lookup(&[("SALEDASH_PUBLIC_USER_ID", "abc")])).is_err());
        assert!(DashboardConfig::from_lookup(lookup(&[("SALEDASH_CHANNEL", "  ")])).is_err());
    }
}
