use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Must exceed the
    /// content model's deadline, since generation blocks the request.
    pub request_timeout_secs: u64,
    /// Shared secret the periodic trigger must present on `/cron` routes.
    pub cron_secret: String,
    /// HMAC secret for verifying payment collaborator webhooks.
    pub payment_webhook_secret: String,
    /// Base domain published subdomains live under (e.g. `siteforge.app`).
    pub site_base_domain: String,
    /// Static image URL the acquisition chain falls back to.
    pub fallback_image_url: String,
    /// JWT token configuration (secret issued by the auth collaborator).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                     |
    /// |--------------------------|-----------------------------|
    /// | `HOST`                   | `0.0.0.0`                   |
    /// | `PORT`                   | `3000`                      |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`     |
    /// | `REQUEST_TIMEOUT_SECS`   | `120`                       |
    /// | `CRON_SHARED_SECRET`     | -- (required)                |
    /// | `PAYMENT_WEBHOOK_SECRET` | -- (required)                |
    /// | `SITE_BASE_DOMAIN`       | `siteforge.app`             |
    /// | `FALLBACK_IMAGE_URL`     | bundled placeholder         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cron_secret = std::env::var("CRON_SHARED_SECRET")
            .expect("CRON_SHARED_SECRET must be set in the environment");
        assert!(!cron_secret.is_empty(), "CRON_SHARED_SECRET must not be empty");

        let payment_webhook_secret = std::env::var("PAYMENT_WEBHOOK_SECRET")
            .expect("PAYMENT_WEBHOOK_SECRET must be set in the environment");
        assert!(
            !payment_webhook_secret.is_empty(),
            "PAYMENT_WEBHOOK_SECRET must not be empty"
        );

        let site_base_domain =
            std::env::var("SITE_BASE_DOMAIN").unwrap_or_else(|_| "siteforge.app".into());

        let fallback_image_url = std::env::var("FALLBACK_IMAGE_URL")
            .unwrap_or_else(|_| "https://static.siteforge.app/placeholder-hero.jpg".into());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cron_secret,
            payment_webhook_secret,
            site_base_domain,
            fallback_image_url,
            jwt,
        }
    }
}
