use std::time::Duration;

pub const DEFAULT_BILLING_STATUS_RPC: &str = "get_account_billing_status";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub backend_anon_key: String,
    pub billing_status_rpc: String,
    /// When set, bearer tokens must verify under HS256 with this secret.
    pub jwt_secret: Option<String>,
    pub authorized_roles: Vec<String>,
    pub lookup_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let require = |name: &str| -> Result<String, String> {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("{name} is required"))
        };

        Ok(Self {
            port: std::env::var("BILLGATE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid BILLGATE_PORT: {e}"))?,
            backend_url: require("BILLGATE_BACKEND_URL")?
                .trim_end_matches('/')
                .to_string(),
            backend_anon_key: require("BILLGATE_BACKEND_ANON_KEY")?,
            billing_status_rpc: std::env::var("BILLGATE_BILLING_STATUS_RPC")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BILLING_STATUS_RPC.to_string()),
            jwt_secret: std::env::var("BILLGATE_JWT_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
            authorized_roles: std::env::var("BILLGATE_AUTHORIZED_ROLES")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| vec!["owner".to_string()]),
            lookup_timeout_secs: std::env::var("BILLGATE_LOOKUP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|e| format!("invalid BILLGATE_LOOKUP_TIMEOUT_SECS: {e}"))?,
            cors_origins: std::env::var("BILLGATE_CORS_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
        })
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
