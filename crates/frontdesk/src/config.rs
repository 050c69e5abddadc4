use std::env;

use anyhow::{anyhow, Result};
use frontdesk_core::{LedgerStore, RoutingPolicy, DEFAULT_SHEET};

pub const DEFAULT_LEDGER_PATH: &str = "appointments.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub ledger_path: String,
    pub sheet_name: String,
    pub verbose: bool,
    routing_selector: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            ledger_path: env::var("FRONTDESK_LEDGER_PATH")
                .unwrap_or_else(|_| DEFAULT_LEDGER_PATH.to_string()),
            sheet_name: env::var("FRONTDESK_SHEET_NAME")
                .unwrap_or_else(|_| DEFAULT_SHEET.to_string()),
            verbose: env_truthy("FRONTDESK_VERBOSE"),
            routing_selector: env::var("FRONTDESK_ROUTING")
                .unwrap_or_else(|_| "single".to_string()),
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(
        mut self,
        ledger: Option<String>,
        routing: Option<String>,
        sheet: Option<String>,
    ) -> Self {
        if let Some(value) = ledger {
            self.ledger_path = value;
        }
        if let Some(value) = routing {
            self.routing_selector = value;
        }
        if let Some(value) = sheet {
            self.sheet_name = value;
        }
        self
    }

    pub fn routing(&self) -> Result<RoutingPolicy> {
        match self.routing_selector.trim().to_lowercase().as_str() {
            "single" | "single-sheet" => Ok(RoutingPolicy::SingleSheet(self.sheet_name.clone())),
            "by-date" | "by_date" => Ok(RoutingPolicy::ByDate),
            other => Err(anyhow!("unknown routing policy {other}")),
        }
    }

    pub fn store(&self) -> Result<LedgerStore> {
        Ok(LedgerStore::new(&self.ledger_path, self.routing()?))
    }
}

fn env_truthy(name: &str) -> bool {
    env::var(name).map(|value| truthy(&value)).unwrap_or(false)
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            ledger_path: "appointments.json".to_string(),
            sheet_name: "Front".to_string(),
            verbose: false,
            routing_selector: "single".to_string(),
        }
    }

    #[test]
    fn overrides_win_over_defaults() {
        let config = base().with_overrides(
            Some("other.json".to_string()),
            Some("by-date".to_string()),
            None,
        );
        assert_eq!(config.ledger_path, "other.json");
        assert_eq!(config.routing().unwrap(), RoutingPolicy::ByDate);
    }

    #[test]
    fn routing_selector_is_case_insensitive_and_validated() {
        let mut config = base();
        config.routing_selector = "SINGLE".to_string();
        assert_eq!(
            config.routing().unwrap(),
            RoutingPolicy::SingleSheet("Front".to_string())
        );
        config.routing_selector = "weekly".to_string();
        assert!(config.routing().is_err());
    }

    #[test]
    fn verbose_flag_accepts_common_truthy_spellings() {
        assert!(truthy("1"));
        assert!(truthy(" Yes "));
        assert!(truthy("TRUE"));
        assert!(truthy("on"));
        assert!(!truthy("0"));
        assert!(!truthy("off"));
        assert!(!truthy(""));
    }
}
