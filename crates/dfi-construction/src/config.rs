//! Service configuration: mode, network and upstream limits.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use dfi_script::{Network, NetworkParams};

use crate::error::ConstructionError;
use crate::types::Currency;

/// Environment variable selecting `ONLINE` or `OFFLINE` mode.
pub const MODE_ENV: &str = "MODE";
/// Environment variable selecting `MAINNET`, `TESTNET` or `REGTEST`.
pub const NETWORK_ENV: &str = "NETWORK";
/// Optional environment variable overriding the upstream timeout, in seconds.
pub const UPSTREAM_TIMEOUT_ENV: &str = "UPSTREAM_TIMEOUT_SECS";

/// Confirmation target used when asking the node for a fee rate.
pub const DEFAULT_CONFIRMATION_TARGET: u32 = 2;
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {name} '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Whether the service may talk to the node and indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Online,
    Offline,
}

impl FromStr for Mode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(Mode::Online),
            "OFFLINE" => Ok(Mode::Offline),
            _ => Err(ConfigurationError::Invalid {
                name: MODE_ENV,
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Online => "ONLINE",
            Mode::Offline => "OFFLINE",
        })
    }
}

/// Configuration shared by the construction and mempool services.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub mode: Mode,
    pub network: Network,
    pub params: &'static NetworkParams,
    pub currency: Currency,
    pub confirmation_target: u32,
    pub upstream_timeout: Duration,
}

impl Configuration {
    /// Configuration for `network` with default limits.
    pub fn new(mode: Mode, network: Network) -> Self {
        Configuration {
            mode,
            network,
            params: network.params(),
            currency: currency_for(network),
            confirmation_target: DEFAULT_CONFIRMATION_TARGET,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Load configuration from the process environment.
    pub fn load_from_environment() -> Result<Self, ConfigurationError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn load_from(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let mode: Mode = lookup(MODE_ENV)
            .ok_or(ConfigurationError::Missing(MODE_ENV))?
            .parse()?;

        let network_value = lookup(NETWORK_ENV).ok_or(ConfigurationError::Missing(NETWORK_ENV))?;
        let network: Network = network_value
            .parse()
            .map_err(|_| ConfigurationError::Invalid {
                name: NETWORK_ENV,
                value: network_value.clone(),
            })?;

        let mut config = Configuration::new(mode, network);
        if let Some(value) = lookup(UPSTREAM_TIMEOUT_ENV) {
            let secs = value
                .parse::<u64>()
                .ok()
                .filter(|&s| s > 0)
                .ok_or(ConfigurationError::Invalid {
                    name: UPSTREAM_TIMEOUT_ENV,
                    value,
                })?;
            config.upstream_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Reject online-only stages when running offline.
    pub fn ensure_online(&self) -> Result<(), ConstructionError> {
        match self.mode {
            Mode::Online => Ok(()),
            Mode::Offline => Err(ConstructionError::UnavailableOffline),
        }
    }
}

/// The native currency of `network`.
pub fn currency_for(network: Network) -> Currency {
    let symbol = match network {
        Network::Mainnet => "DFI",
        Network::Testnet | Network::Regtest => "tDFI",
    };
    Currency {
        symbol: symbol.to_string(),
        decimals: 8,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_testnet_online() {
        let config =
            Configuration::load_from(lookup(&[("MODE", "ONLINE"), ("NETWORK", "TESTNET")])).unwrap();
        assert_eq!(config.mode, Mode::Online);
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.params.bech32_hrp, "tf");
        assert_eq!(config.currency.symbol, "tDFI");
        assert_eq!(config.confirmation_target, 2);
        assert_eq!(config.upstream_timeout, DEFAULT_UPSTREAM_TIMEOUT);
        assert!(config.ensure_online().is_ok());
    }

    #[test]
    fn test_load_timeout_override() {
        let config = Configuration::load_from(lookup(&[
            ("MODE", "offline"),
            ("NETWORK", "mainnet"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.currency.symbol, "DFI");
        assert!(matches!(
            config.ensure_online(),
            Err(ConstructionError::UnavailableOffline)
        ));
    }

    #[test]
    fn test_load_rejects_bad_values() {
        assert_eq!(
            Configuration::load_from(lookup(&[("NETWORK", "TESTNET")])).unwrap_err(),
            ConfigurationError::Missing("MODE")
        );
        assert!(Configuration::load_from(lookup(&[("MODE", "SOMETIMES"), ("NETWORK", "TESTNET")]))
            .is_err());
        assert!(Configuration::load_from(lookup(&[("MODE", "ONLINE"), ("NETWORK", "SIGNET")]))
            .is_err());
        assert!(Configuration::load_from(lookup(&[
            ("MODE", "ONLINE"),
            ("NETWORK", "TESTNET"),
            ("UPSTREAM_TIMEOUT_SECS", "0"),
        ]))
        .is_err());
    }

    #[test]
    fn test_load_network_names() {
        let config =
            Configuration::load_from(lookup(&[("MODE", "ONLINE"), ("NETWORK", "regtest")])).unwrap();
        assert_eq!(config.network, Network::Regtest);
        assert_eq!(config.params.bech32_hrp, "bcrt");

        let config =
            Configuration::load_from(lookup(&[("MODE", "ONLINE"), ("NETWORK", "main")])).unwrap();
        assert_eq!(config.network, Network::Mainnet);

        assert_eq!(
            Configuration::load_from(lookup(&[("MODE", "ONLINE"), ("NETWORK", "signet")]))
                .unwrap_err(),
            ConfigurationError::Invalid {
                name: "NETWORK",
                value: "signet".to_string(),
            }
        );
    }
}
