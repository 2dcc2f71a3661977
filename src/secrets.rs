// src/secrets.rs
//
// Ordered credential lookup: external vault (1Password CLI) -> environment
// variable -> static config value. First non-empty match wins; a missing
// secret only disables the feature that needed it.
use serde::Deserialize;
use std::process::Command;

pub const ENV_ANTHROPIC_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";

pub struct SecretsManager {
    use_vault: bool,
}

impl SecretsManager {
    pub fn new(use_vault: bool) -> Self {
        let available = use_vault && vault_available();
        if use_vault && !available {
            tracing::warn!("1password cli not available or not signed in, falling back to env vars");
        }
        Self {
            use_vault: available,
        }
    }

    /// Resolve one secret through the fallback order. `config_value` is the
    /// static last resort and is normally empty.
    pub fn resolve(
        &self,
        name: &str,
        vault_item: &str,
        env_var: &str,
        config_value: &str,
    ) -> Option<String> {
        if self.use_vault && !vault_item.is_empty() {
            if let Some(v) = read_from_vault(vault_item) {
                tracing::info!(secret = name, item = vault_item, "retrieved from vault");
                return Some(v);
            }
        }

        if let Ok(v) = std::env::var(env_var) {
            if !v.is_empty() {
                tracing::info!(secret = name, var = env_var, "retrieved from environment");
                return Some(v);
            }
        }

        if !config_value.is_empty() {
            tracing::info!(secret = name, "retrieved from static config");
            return Some(config_value.to_string());
        }

        tracing::warn!(secret = name, "not found in vault, environment, or config");
        None
    }
}

fn vault_available() -> bool {
    Command::new("op")
        .arg("whoami")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct OpItem {
    #[serde(default)]
    fields: Vec<OpField>,
}

#[derive(Debug, Deserialize)]
struct OpField {
    #[serde(default)]
    id: String,
    #[serde(default)]
    label: String,
    value: Option<String>,
}

/// `op item get <item> --format json`, scanning the common credential fields.
fn read_from_vault(item_name: &str) -> Option<String> {
    let out = Command::new("op")
        .args(["item", "get", item_name, "--format", "json"])
        .output()
        .ok()?;
    if !out.status.success() {
        tracing::warn!(item = item_name, "vault item not found");
        return None;
    }

    let item: OpItem = serde_json::from_slice(&out.stdout).ok()?;
    const COMMON_FIELDS: &[&str] = &["credential", "password", "api key", "api_key", "token", "secret"];
    for field in item.fields {
        let label = field.label.to_ascii_lowercase();
        let id = field.id.to_ascii_lowercase();
        if COMMON_FIELDS.iter().any(|c| label.contains(c) || id.contains(c)) {
            if let Some(v) = field.value.filter(|v| !v.is_empty()) {
                return Some(v);
            }
        }
    }
    tracing::warn!(item = item_name, "no credential-like field in vault item");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn env_var_beats_config_value() {
        std::env::set_var("MONITOR_TEST_SECRET", "from-env");
        let mgr = SecretsManager { use_vault: false };
        let got = mgr.resolve("test", "", "MONITOR_TEST_SECRET", "from-config");
        assert_eq!(got.as_deref(), Some("from-env"));
        std::env::remove_var("MONITOR_TEST_SECRET");
    }

    #[serial_test::serial]
    #[test]
    fn config_value_is_last_resort() {
        std::env::remove_var("MONITOR_TEST_SECRET");
        let mgr = SecretsManager { use_vault: false };
        let got = mgr.resolve("test", "", "MONITOR_TEST_SECRET", "from-config");
        assert_eq!(got.as_deref(), Some("from-config"));

        let none = mgr.resolve("test", "", "MONITOR_TEST_SECRET", "");
        assert!(none.is_none());
    }
}
