//! Environment-driven configuration

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_RATE_URL: &str = "https://www.exchangerates.org.uk/UAH-USD-exchange-rate-history.html";
const DEFAULT_FALLBACK_RATE: f64 = 0.041;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configured fallback rate, if it is a usable rate at all
fn fallback_rate(raw: Option<String>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .unwrap_or(DEFAULT_FALLBACK_RATE)
}

/// Exchange rate oracle settings
#[derive(Debug, Clone)]
pub struct RateConfig {
    pub url: String,
    /// `id` attribute of the `<span>` holding the rate
    pub element_id: String,
    pub fallback: f64,
    pub timeout: Duration,
}

impl RateConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("EXPENSE_RATE_URL").unwrap_or_else(|_| DEFAULT_RATE_URL.to_string()),
            element_id: std::env::var("EXPENSE_RATE_ELEMENT_ID")
                .unwrap_or_else(|_| "usd-rate".to_string()),
            fallback: fallback_rate(std::env::var("EXPENSE_RATE_FALLBACK").ok()),
            timeout: Duration::from_secs(env_or("EXPENSE_RATE_TIMEOUT_SECS", 5)),
        }
    }
}

/// Expense service settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub rates: RateConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let db_path = std::env::var("EXPENSE_DB_PATH").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            format!("{home}/.expense-tracker/expenses.db")
        });

        Self {
            db_path: PathBuf::from(db_path),
            port: env_or("EXPENSE_PORT", 8000),
            rates: RateConfig::from_env(),
        }
    }
}

/// Conversation agent settings
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the expense service
    pub api_url: String,
    pub api_timeout: Duration,
    /// Chat gateway port
    pub port: u16,
    /// Currency code shown in prompts and report captions
    pub local_currency: String,
    /// Where the console transport writes documents
    pub document_dir: PathBuf,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("EXPENSE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_timeout: Duration::from_secs(env_or("EXPENSE_API_TIMEOUT_SECS", 10)),
            port: env_or("AGENT_PORT", 8080),
            local_currency: std::env::var("AGENT_LOCAL_CURRENCY")
                .unwrap_or_else(|_| "UAH".to_string()),
            document_dir: std::env::var("AGENT_DOCUMENT_DIR")
                .map_or_else(|_| std::env::temp_dir(), PathBuf::from),
        }
    }
}
