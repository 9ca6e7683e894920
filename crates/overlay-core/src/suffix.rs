//! Suffix generation: which file base names make up a configuration name
//!
//! The list returned for a name is ordered lowest precedence first; every
//! later entry overlays the ones before it.

use std::collections::HashMap;

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_ENV: &str = "OVERLAY_ENV";

/// Environment variable overriding the host name used for host overlays.
pub const HOSTNAME_ENV: &str = "OVERLAY_HOSTNAME";

/// Produces the ordered, fully suffixed base names for a configuration name.
pub trait SuffixSource: Send + Sync {
    fn suffixes_for(&self, name: &str) -> Vec<String>;
}

/// The conventional overlay order.
///
/// For configuration `N`, environment `E` and host `H`:
///
/// 1. `N`
/// 2. `N_local`
/// 3. `N_config`
/// 4. `N_local_config`
/// 5. `N_E`
/// 6. `N_E_local`
/// 7. `N_H`
/// 8. `N_H_config_local`
///
/// Environment and host entries are skipped when the value is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardSuffixes {
    environment: Option<String>,
    hostname: Option<String>,
}

impl StandardSuffixes {
    pub fn new(environment: Option<String>, hostname: Option<String>) -> Self {
        Self {
            environment: environment.filter(|s| !s.is_empty()),
            hostname: hostname.filter(|s| !s.is_empty()),
        }
    }

    /// Environment from `OVERLAY_ENV` (falling back to `RUST_ENV`), host from
    /// `OVERLAY_HOSTNAME` (falling back to `HOSTNAME`).
    pub fn from_env() -> Self {
        let environment = std::env::var(ENVIRONMENT_ENV)
            .or_else(|_| std::env::var("RUST_ENV"))
            .ok();
        let hostname = std::env::var(HOSTNAME_ENV)
            .or_else(|_| std::env::var("HOSTNAME"))
            .ok()
            .map(|h| short_hostname(&h).to_string());
        Self::new(environment, hostname)
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
}

/// First label of a dotted host name.
fn short_hostname(host: &str) -> &str {
    host.split('.').next().unwrap_or(host)
}

impl SuffixSource for StandardSuffixes {
    fn suffixes_for(&self, name: &str) -> Vec<String> {
        let mut out = vec![
            name.to_string(),
            format!("{name}_local"),
            format!("{name}_config"),
            format!("{name}_local_config"),
        ];
        if let Some(env) = &self.environment {
            out.push(format!("{name}_{env}"));
            out.push(format!("{name}_{env}_local"));
        }
        if let Some(host) = &self.hostname {
            out.push(format!("{name}_{host}"));
            out.push(format!("{name}_{host}_config_local"));
        }
        out
    }
}

/// An explicit table of suffix lists.
///
/// Names without an entry resolve to just themselves.
#[derive(Debug, Clone, Default)]
pub struct FixedSuffixes {
    table: HashMap<String, Vec<String>>,
}

impl FixedSuffixes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, suffixed: &[&str]) -> Self {
        self.table.insert(
            name.to_string(),
            suffixed.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

impl SuffixSource for FixedSuffixes {
    fn suffixes_for(&self, name: &str) -> Vec<String> {
        self.table
            .get(name)
            .cloned()
            .unwrap_or_else(|| vec![name.to_string()])
    }
}
