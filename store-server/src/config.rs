//! Server configuration
//!
//! All settings come from environment variables (a `.env` file is loaded in
//! `main`). Secrets must be set explicitly outside development.
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | `HTTP_PORT` | `3000` | HTTP listen port |
//! | `ENVIRONMENT` | `development` | development / staging / production |
//! | `DATABASE_PATH` | `data/store.db` | SQLite database file |
//! | `STORE_BACKEND` | `sqlite` | `sqlite` or `memory` |
//! | `JWT_SECRET` | dev placeholder | HS256 key shared with the identity service |
//! | `STRIPE_SECRET_KEY` | dev placeholder | payment gateway API key |
//! | `STRIPE_API_BASE` | `https://api.stripe.com` | gateway endpoint override |
//! | `CHECKOUT_CURRENCY` | `inr` | currency for gateway line items |
//! | `FRONTEND_URL` | `http://localhost:5173/` | base for checkout redirect URLs |
//! | `GATEWAY_TIMEOUT_MS` | `30000` | outbound gateway request timeout |

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// SQLite database file path
    pub database_path: String,
    /// Order store backend: `sqlite` (durable) or `memory` (reference impl)
    pub store_backend: String,
    /// JWT signing secret shared with the external identity service
    pub jwt_secret: String,
    /// Payment gateway secret key; empty selects the mock gateway in
    /// development
    pub stripe_secret_key: String,
    /// Payment gateway API base URL
    pub stripe_api_base: String,
    /// Currency code for gateway line items
    pub checkout_currency: String,
    /// Storefront base URL for checkout redirects (trailing slash)
    pub frontend_url: String,
    /// Timeout for outbound gateway calls, milliseconds
    pub gateway_timeout_ms: u64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                String::new()
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/store.db".into()),
            store_backend: std::env::var("STORE_BACKEND").unwrap_or_else(|_| "sqlite".into()),
            jwt_secret: {
                let secret = Self::require_secret("JWT_SECRET", &environment)?;
                if secret.is_empty() {
                    "dev-jwt-secret-not-for-production!!!".into()
                } else {
                    secret
                }
            },
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            checkout_currency: std::env::var("CHECKOUT_CURRENCY")
                .unwrap_or_else(|_| "inr".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173/".into()),
            gateway_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30_000),
            environment,
        })
    }

    /// Redirect target after completed checkout; the gateway substitutes the
    /// session id placeholder itself.
    pub fn checkout_success_url(&self) -> String {
        format!(
            "{}orders/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url
        )
    }

    /// Redirect target after abandoned checkout
    pub fn checkout_cancel_url(&self) -> String {
        format!("{}orders/cancel", self.frontend_url)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
