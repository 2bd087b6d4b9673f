//! Startup settings read from the environment.

use std::time::Duration;

use foyer_session::SessionConfig;

use crate::{FoyerError, FoyerServerBuilder};

pub const DEFAULT_WS_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8081";

/// Everything the `foyer` binary needs to start a server.
///
/// | variable | default |
/// |---|---|
/// | `FOYER_WS_ADDR` | `0.0.0.0:8080` |
/// | `FOYER_HTTP_ADDR` | `0.0.0.0:$PORT` if `PORT` is set, else `0.0.0.0:8081` |
/// | `FOYER_REGISTRATION_EXPIRY_SECS` | 120 |
/// | `FOYER_IDLE_TIMEOUT_SECS` | 30 |
#[derive(Debug, Clone)]
pub struct Settings {
    pub ws_addr: String,
    pub http_addr: String,
    pub session: SessionConfig,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, FoyerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FoyerError> {
        let ws_addr = lookup("FOYER_WS_ADDR").unwrap_or_else(|| DEFAULT_WS_ADDR.to_string());
        let http_addr = match (lookup("FOYER_HTTP_ADDR"), lookup("PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => format!("0.0.0.0:{}", parse_port(&port)?),
            (None, None) => DEFAULT_HTTP_ADDR.to_string(),
        };

        let mut session = SessionConfig::default();
        if let Some(value) = lookup("FOYER_REGISTRATION_EXPIRY_SECS") {
            session.registration_expiry = parse_secs("FOYER_REGISTRATION_EXPIRY_SECS", value)?;
        }
        if let Some(value) = lookup("FOYER_IDLE_TIMEOUT_SECS") {
            session.idle_timeout = parse_secs("FOYER_IDLE_TIMEOUT_SECS", value)?;
        }

        Ok(Self {
            ws_addr,
            http_addr,
            session,
        })
    }

    /// A server builder configured with these settings.
    pub fn builder(&self) -> FoyerServerBuilder {
        FoyerServerBuilder::new()
            .bind(&self.ws_addr)
            .registration_addr(&self.http_addr)
            .session_config(self.session.clone())
    }
}

fn parse_port(value: &str) -> Result<u16, FoyerError> {
    value.trim().parse().map_err(|e: std::num::ParseIntError| FoyerError::Config {
        name: "PORT",
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_secs(name: &'static str, value: String) -> Result<Duration, FoyerError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(FoyerError::Config {
            name,
            value,
            reason: "must be at least 1".into(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(FoyerError::Config {
            name,
            value,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, FoyerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_from_lookup_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.ws_addr, DEFAULT_WS_ADDR);
        assert_eq!(s.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(s.session.registration_expiry, Duration::from_secs(120));
        assert_eq!(s.session.idle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_port_sets_http_addr() {
        let s = settings(&[("PORT", "9000")]).unwrap();
        assert_eq!(s.http_addr, "0.0.0.0:9000");
    }

    #[test]
    fn test_from_lookup_explicit_http_addr_wins_over_port() {
        let s = settings(&[("PORT", "9000"), ("FOYER_HTTP_ADDR", "127.0.0.1:7000")]).unwrap();
        assert_eq!(s.http_addr, "127.0.0.1:7000");
    }

    #[test]
    fn test_from_lookup_overrides_timeouts() {
        let s = settings(&[
            ("FOYER_REGISTRATION_EXPIRY_SECS", "5"),
            ("FOYER_IDLE_TIMEOUT_SECS", "10"),
        ])
        .unwrap();
        assert_eq!(s.session.registration_expiry, Duration::from_secs(5));
        assert_eq!(s.session.idle_timeout, Duration::from_secs(10));
        assert_eq!(s.session.ping_interval(), Duration::from_secs(9));
    }

    #[test]
    fn test_from_lookup_rejects_non_numeric_timeout() {
        let result = settings(&[("FOYER_IDLE_TIMEOUT_SECS", "soon")]);
        assert!(matches!(
            result,
            Err(FoyerError::Config { name: "FOYER_IDLE_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn test_from_lookup_rejects_zero_expiry() {
        let result = settings(&[("FOYER_REGISTRATION_EXPIRY_SECS", "0")]);
        assert!(matches!(result, Err(FoyerError::Config { .. })));
    }

    #[test]
    fn test_from_lookup_rejects_bad_port() {
        assert!(matches!(
            settings(&[("PORT", "http")]),
            Err(FoyerError::Config { name: "PORT", .. })
        ));
    }
}
