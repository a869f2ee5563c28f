use std::time::Duration;

/// OAuth client credentials for one identity provider.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// HTTP email API settings. Env vars: `EMAIL_API_URL`, `EMAIL_API_KEY`,
/// `EMAIL_FROM_ADDRESS`, `EMAIL_FROM_NAME`.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
    pub from_name: String,
}

/// WhatsApp gateway settings. Env vars: `WHATSAPP_API_URL`, `WHATSAPP_API_KEY`.
#[derive(Debug, Clone)]
pub struct WhatsappSettings {
    pub api_url: String,
    pub api_key: String,
}

/// Exchange service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ExchangeConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// HMAC secret for signing session cookies.
    pub session_secret: String,
    /// Public origin (e.g. "https://santa.example.com"), used for OAuth
    /// redirect URIs and participant links.
    pub public_base_url: String,
    /// TCP port to listen on (default 3120). Env var: `EXCHANGE_PORT`.
    pub exchange_port: u16,
    /// Bound on every Data Store, Redis and outbound HTTP call (default 10s).
    /// Env var: `UPSTREAM_TIMEOUT_SECS`.
    pub upstream_timeout: Duration,
    pub discord: Option<OAuthCredentials>,
    pub google: Option<OAuthCredentials>,
    pub email: Option<EmailSettings>,
    pub whatsapp: Option<WhatsappSettings>,
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn oauth(prefix: &str) -> Option<OAuthCredentials> {
    Some(OAuthCredentials {
        client_id: optional(&format!("{prefix}_CLIENT_ID"))?,
        client_secret: optional(&format!("{prefix}_CLIENT_SECRET"))?,
    })
}

fn email() -> Option<EmailSettings> {
    Some(EmailSettings {
        api_url: optional("EMAIL_API_URL")?,
        api_key: optional("EMAIL_API_KEY")?,
        from_address: optional("EMAIL_FROM_ADDRESS")?,
        from_name: optional("EMAIL_FROM_NAME").unwrap_or_else(|| "Secret Santa".to_owned()),
    })
}

fn whatsapp() -> Option<WhatsappSettings> {
    Some(WhatsappSettings {
        api_url: optional("WHATSAPP_API_URL")?,
        api_key: optional("WHATSAPP_API_KEY")?,
    })
}

impl ExchangeConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            session_secret: std::env::var("SESSION_SECRET").expect("SESSION_SECRET"),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .expect("PUBLIC_BASE_URL")
                .trim_end_matches('/')
                .to_owned(),
            exchange_port: std::env::var("EXCHANGE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            upstream_timeout: Duration::from_secs(
                std::env::var("UPSTREAM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            discord: oauth("DISCORD"),
            google: oauth("GOOGLE"),
            email: email(),
            whatsapp: whatsapp(),
        }
    }
}
