//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_SECRET` - Shared admin secret for the login form and `X-Admin-Secret` (min 12 chars)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (default: `http://{host}:{port}`)
//! - `STOREFRONT_URL` - Storefront link used in emails (default: <https://sareine.in>)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (email - sends fail until both credentials are set)
//! - `SMTP_HOST` - SMTP server hostname (default: smtp.gmail.com)
//! - `SMTP_PORT` - SMTP port (default: 465)
//! - `SMTP_TLS` - `tls` (implicit), `starttls` or `none` (default: tls)
//! - `SMTP_USERNAME` / `GMAIL_USER` - SMTP authentication username
//! - `SMTP_PASSWORD` / `GMAIL_APP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Sender address (default: the username)
//!
//! ## Optional (Razorpay - payment links are unavailable until both keys are set)
//! - `RZP_KEY_ID` / `RZP_TEST_KEY_ID` - API key id
//! - `RZP_KEY_SECRET` - API key secret
//! - `RZP_WEBHOOK_SECRET` - Webhook signing secret
//! - `RAZORPAY_API_BASE` - API base URL (default: <https://api.razorpay.com/v1>)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ADMIN_SECRET_LENGTH: usize = 12;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const DEFAULT_STOREFRONT_URL: &str = "https://sareine.in";
const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Storefront URL linked from outgoing emails
    pub storefront_url: String,
    /// Shared admin secret
    pub admin_secret: SecretString,
    /// SMTP configuration, absent until credentials are set
    pub email: Option<EmailConfig>,
    /// Names of the SMTP variables that were not set (empty when `email` is present)
    pub email_missing: Vec<&'static str>,
    /// Razorpay configuration, absent until both keys are set
    pub razorpay: Option<RazorpayConfig>,
    /// Razorpay webhook signing secret
    pub razorpay_webhook_secret: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// TLS from the first byte (port 465).
    Implicit,
    /// Plain connection upgraded with STARTTLS (port 587).
    StartTls,
    /// No encryption. Local relays and test servers only.
    None,
}

impl std::str::FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tls" | "implicit" | "ssl" => Ok(Self::Implicit),
            "starttls" => Ok(Self::StartTls),
            "none" => Ok(Self::None),
            other => Err(format!("expected tls, starttls or none, got {other:?}")),
        }
    }
}

/// Email (SMTP) configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// Connection security
    pub tls: SmtpTls,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("tls", &self.tls)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl EmailConfig {
    /// Load SMTP settings, returning the names of missing credentials when
    /// they are not both set.
    fn from_env() -> Result<Result<Self, Vec<&'static str>>, ConfigError> {
        let username = get_env_with_alias("SMTP_USERNAME", "GMAIL_USER");
        let password = get_env_with_alias("SMTP_PASSWORD", "GMAIL_APP_PASSWORD");

        let (smtp_username, smtp_password) = match (username, password) {
            (Some(u), Some(p)) => (u, p),
            (u, p) => {
                let mut missing = Vec::new();
                if u.is_none() {
                    missing.push("SMTP_USERNAME");
                }
                if p.is_none() {
                    missing.push("SMTP_PASSWORD");
                }
                return Ok(Err(missing));
            }
        };

        let smtp_port = get_env_or_default("SMTP_PORT", "465")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;
        let tls = get_env_or_default("SMTP_TLS", "tls")
            .parse::<SmtpTls>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_TLS".to_string(), e))?;
        let from_address = get_optional_env("SMTP_FROM").unwrap_or_else(|| smtp_username.clone());

        Ok(Ok(Self {
            smtp_host: get_env_or_default("SMTP_HOST", "smtp.gmail.com"),
            smtp_port,
            tls,
            smtp_username,
            smtp_password: SecretString::from(smtp_password),
            from_address,
        }))
    }
}

/// Razorpay API configuration.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API key id (public half)
    pub key_id: String,
    /// API key secret
    pub key_secret: SecretString,
    /// API base URL, without trailing slash
    pub api_base: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl RazorpayConfig {
    /// Load Razorpay configuration from environment.
    ///
    /// Returns `None` unless both the key id and key secret are set.
    fn from_env() -> Option<Self> {
        let key_id = get_env_with_alias("RZP_KEY_ID", "RZP_TEST_KEY_ID");
        let key_secret = get_optional_env("RZP_KEY_SECRET");

        match (key_id, key_secret) {
            (Some(key_id), Some(key_secret)) => Some(Self {
                key_id,
                key_secret: SecretString::from(key_secret),
                api_base: get_env_or_default("RAZORPAY_API_BASE", DEFAULT_RAZORPAY_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
            }),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "Only one of RZP_KEY_ID and RZP_KEY_SECRET is set; payment links are disabled"
                );
                None
            }
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the admin secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url =
            get_optional_env("ADMIN_BASE_URL").unwrap_or_else(|| format!("http://{host}:{port}"));
        let storefront_url = get_env_or_default("STOREFRONT_URL", DEFAULT_STOREFRONT_URL)
            .trim_end_matches('/')
            .to_string();

        let admin_secret = get_required_secret("ADMIN_SECRET")?;
        validate_admin_secret(&admin_secret, "ADMIN_SECRET")?;

        let (email, email_missing) = match EmailConfig::from_env()? {
            Ok(email) => (Some(email), Vec::new()),
            Err(missing) => (None, missing),
        };
        let razorpay = RazorpayConfig::from_env();
        let razorpay_webhook_secret = get_optional_env("RZP_WEBHOOK_SECRET").map(SecretString::from);

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            storefront_url,
            admin_secret,
            email,
            email_missing,
            razorpay,
            razorpay_webhook_secret,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Returns a reference to the Razorpay configuration (if configured).
    #[must_use]
    pub const fn razorpay(&self) -> Option<&RazorpayConfig> {
        self.razorpay.as_ref()
    }

    /// Configuration suitable for tests and local tooling.
    ///
    /// No integrations are configured; the secret is the one given.
    #[must_use]
    pub fn for_tests(admin_secret: &str) -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/sareine_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://127.0.0.1:3001".to_string(),
            storefront_url: DEFAULT_STOREFRONT_URL.to_string(),
            admin_secret: SecretString::from(admin_secret),
            email: None,
            email_missing: vec!["SMTP_USERNAME", "SMTP_PASSWORD"],
            razorpay: None,
            razorpay_webhook_secret: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an optional environment variable, trying a legacy name second.
fn get_env_with_alias(key: &str, alias: &str) -> Option<String> {
    get_optional_env(key).or_else(|| get_optional_env(alias))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Validate the shared admin secret: minimum length, no placeholder text.
///
/// Low entropy only produces a warning, since the secret is typed by hand.
fn validate_admin_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.chars().count() < MIN_ADMIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_SECRET_LENGTH,
                value.chars().count()
            ),
        ));
    }
    check_placeholder(value, var_name)?;

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        tracing::warn!(
            "{var_name} has low entropy ({entropy:.2} bits/char); consider a randomly generated secret"
        );
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject values that look like copied placeholder text.
fn check_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_admin_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_admin_secret(&secret, "ADMIN_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_admin_secret_placeholder() {
        let secret = SecretString::from("changeme-admin-2026");
        assert!(validate_admin_secret(&secret, "ADMIN_SECRET").is_err());

        let secret = SecretString::from("your-admin-secret");
        assert!(validate_admin_secret(&secret, "ADMIN_SECRET").is_err());
    }

    #[test]
    fn test_admin_secret_valid() {
        let secret = SecretString::from("sRn-7Qe!v2Lp#9Wd");
        assert!(validate_admin_secret(&secret, "ADMIN_SECRET").is_ok());
    }

    #[test]
    fn test_smtp_tls_parse() {
        assert_eq!("tls".parse::<SmtpTls>().unwrap(), SmtpTls::Implicit);
        assert_eq!("STARTTLS".parse::<SmtpTls>().unwrap(), SmtpTls::StartTls);
        assert_eq!("none".parse::<SmtpTls>().unwrap(), SmtpTls::None);
        assert!("ssl3".parse::<SmtpTls>().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig::for_tests("sRn-7Qe!v2Lp#9Wd");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_email_config_debug_redacts_secrets() {
        let config = EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            tls: SmtpTls::Implicit,
            smtp_username: "sareinebeauty@gmail.com".to_string(),
            smtp_password: SecretString::from("super_secret_app_password"),
            from_address: "sareinebeauty@gmail.com".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.gmail.com"));
        assert!(debug_output.contains("465"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_app_password"));
    }

    #[test]
    fn test_razorpay_config_debug_redacts_secrets() {
        let config = RazorpayConfig {
            key_id: "rzp_test_abc123".to_string(),
            key_secret: SecretString::from("rzp_super_secret_value"),
            api_base: DEFAULT_RAZORPAY_API_BASE.to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("rzp_test_abc123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("rzp_super_secret_value"));
    }
}
