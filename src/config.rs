use std::net::IpAddr;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub store: StoreConfig,
    pub webhook_base_url: String,
    pub webhook_timeout_secs: u64,
    pub max_body_size: usize,
    pub submission_rate_limit: u32,
    pub submission_rate_window_secs: u64,
    pub trusted_proxies: Vec<IpNet>,
    pub log_level: String,
}

/// Hosted database REST access. The service-role key never leaves the server.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub service_role_key: String,
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn rest_endpoint(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let store_url = std::env::var("SUPABASE_URL")
            .or_else(|_| std::env::var("NEXT_PUBLIC_SUPABASE_URL"))
            .map_err(|_| {
                "Missing required environment variable: SUPABASE_URL (or NEXT_PUBLIC_SUPABASE_URL)"
                    .to_string()
            })?;
        let service_role_key = env_required("SUPABASE_SERVICE_ROLE_KEY")?;

        let host: IpAddr = env_or("FORMRELAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_HOST: {e}"))?;

        let port: u16 = env_or("FORMRELAY_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_PORT: {e}"))?;

        let base_url = env_or("FORMRELAY_BASE_URL", &format!("http://{host}:{port}"));

        let webhook_base_url = env_or(
            "FORMRELAY_WEBHOOK_BASE_URL",
            "https://contentlabs.app.n8n.cloud/webhook",
        );

        let webhook_timeout_secs: u64 = env_or("FORMRELAY_WEBHOOK_TIMEOUT_SECS", "120")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_WEBHOOK_TIMEOUT_SECS: {e}"))?;

        let store_timeout_secs: u64 = env_or("FORMRELAY_STORE_TIMEOUT_SECS", "15")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_STORE_TIMEOUT_SECS: {e}"))?;

        let max_body_size: usize = env_or("FORMRELAY_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_MAX_BODY_SIZE: {e}"))?;

        let submission_rate_limit: u32 = env_or("FORMRELAY_SUBMISSION_RATE_LIMIT", "5")
            .parse()
            .map_err(|e| format!("Invalid FORMRELAY_SUBMISSION_RATE_LIMIT: {e}"))?;

        let submission_rate_window_secs: u64 =
            env_or("FORMRELAY_SUBMISSION_RATE_WINDOW_SECS", "600")
                .parse()
                .map_err(|e| format!("Invalid FORMRELAY_SUBMISSION_RATE_WINDOW_SECS: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("FORMRELAY_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid FORMRELAY_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = env_or("FORMRELAY_LOG_LEVEL", "info");

        Ok(Config {
            host,
            port,
            base_url,
            store: StoreConfig {
                url: store_url,
                service_role_key,
                timeout_secs: store_timeout_secs,
            },
            webhook_base_url,
            webhook_timeout_secs,
            max_body_size,
            submission_rate_limit,
            submission_rate_window_secs,
            trusted_proxies,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
