// Configuration management

use crate::auth::password::DEFAULT_BCRYPT_COST;
use crate::core::errors::ServiceError;
use secrecy::Secret;
use std::env;
use std::path::PathBuf;

/// bcrypt accepts costs in this range
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Application configuration loaded from environment variables
///
/// All configuration is validated on load with clear error messages.
#[derive(Clone)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Database configuration
    pub database_url: String,
    pub db_max_connections: u32,

    // Token signing secret
    pub jwt_secret: Secret<String>,

    // Certificate configuration
    pub verification_base_url: String,
    pub upload_dir: PathBuf,
    pub require_auth_for_create: bool,

    // Password hashing
    pub bcrypt_cost: u32,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("database_url", &redact_url(&self.database_url))
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_secret", &self.jwt_secret)
            .field("verification_base_url", &self.verification_base_url)
            .field("upload_dir", &self.upload_dir)
            .field("require_auth_for_create", &self.require_auth_for_create)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("body_size_limit_bytes", &self.body_size_limit_bytes)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    pub fn from_env() -> Result<Self, ServiceError> {
        // Skip in test environment to avoid interfering with test environment variables
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0")?,
            port: Self::parse_port()?,
            database_url: Self::get_required_env("DATABASE_URL")?,
            db_max_connections: Self::parse_u32_or_default("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: Secret::new(Self::get_required_env("JWT_SECRET")?),
            verification_base_url: Self::get_env_or_default(
                "VERIFICATION_BASE_URL",
                "http://localhost:3000",
            )?,
            upload_dir: PathBuf::from(Self::get_env_or_default("UPLOAD_DIR", "uploads")?),
            require_auth_for_create: Self::parse_bool_or_default("REQUIRE_AUTH_FOR_CREATE", false)?,
            bcrypt_cost: Self::parse_u32_or_default("BCRYPT_COST", DEFAULT_BCRYPT_COST)?,
            request_timeout_secs: Self::parse_u64_or_default("REQUEST_TIMEOUT_SECS", 30)?,
            body_size_limit_bytes: Self::parse_usize_or_default(
                "BODY_SIZE_LIMIT_BYTES",
                10 * 1024 * 1024,
            )?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info")?,
            log_format: Self::get_env_or_default("LOG_FORMAT", "json")?,
        };

        // Post-load validation
        config.validate()?;

        Ok(config)
    }

    /// Get environment variable or return default value
    fn get_env_or_default(key: &str, default: &str) -> Result<String, ServiceError> {
        Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
    }

    /// Get a required, non-empty environment variable
    fn get_required_env(key: &str) -> Result<String, ServiceError> {
        let value = env::var(key)
            .map_err(|_| ServiceError::ConfigurationError(format!("{} not set", key)))?;

        if value.is_empty() {
            return Err(ServiceError::ConfigurationError(format!("{} is empty", key)));
        }

        Ok(value)
    }

    /// Parse port from PORT environment variable
    fn parse_port() -> Result<u16, ServiceError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
        let port = port_str.parse::<u16>()
            .map_err(|e| ServiceError::ConfigurationError(
                format!("Invalid PORT value '{}': {}", port_str, e)
            ))?;

        if port == 0 {
            return Err(ServiceError::ConfigurationError(
                "PORT must be between 1 and 65535".to_string()
            ));
        }

        Ok(port)
    }

    /// Parse u64 from environment variable or return default
    fn parse_u64_or_default(key: &str, default: u64) -> Result<u64, ServiceError> {
        match env::var(key) {
            Ok(value) => Self::parse_positive(key, &value),
            _ => Ok(default),
        }
    }

    /// Parse u32 from environment variable or return default
    fn parse_u32_or_default(key: &str, default: u32) -> Result<u32, ServiceError> {
        match env::var(key) {
            Ok(value) => Self::parse_positive(key, &value),
            _ => Ok(default),
        }
    }

    /// Parse usize from environment variable or return default
    fn parse_usize_or_default(key: &str, default: usize) -> Result<usize, ServiceError> {
        match env::var(key) {
            Ok(value) => Self::parse_positive(key, &value),
            _ => Ok(default),
        }
    }

    /// Parse a strictly positive integer
    fn parse_positive<T>(key: &str, value: &str) -> Result<T, ServiceError>
    where
        T: std::str::FromStr + PartialEq + Default,
        T::Err: std::fmt::Display,
    {
        let parsed = value.parse::<T>()
            .map_err(|e| ServiceError::ConfigurationError(
                format!("Invalid {} value '{}': {}", key, value, e)
            ))?;

        if parsed == T::default() {
            return Err(ServiceError::ConfigurationError(
                format!("{} must be greater than 0", key)
            ));
        }

        Ok(parsed)
    }

    /// Parse boolean from environment variable or return default
    fn parse_bool_or_default(key: &str, default: bool) -> Result<bool, ServiceError> {
        match env::var(key) {
            Ok(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ServiceError::ConfigurationError(
                    format!("Invalid {} value '{}': expected true or false", key, value)
                )),
            },
            _ => Ok(default),
        }
    }

    /// Validate all configuration values
    fn validate(&self) -> Result<(), ServiceError> {
        Self::validate_url(&self.database_url, "Database URL")?;
        Self::validate_url(&self.verification_base_url, "Verification base URL")?;
        Self::validate_bcrypt_cost(self.bcrypt_cost)?;
        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;
        Ok(())
    }

    /// Validate URL format
    fn validate_url(url: &str, description: &str) -> Result<(), ServiceError> {
        url::Url::parse(url)
            .map_err(|e| ServiceError::ConfigurationError(
                format!("Invalid {} '{}': {}", description, redact_url(url), e)
            ))?;
        Ok(())
    }

    /// Validate bcrypt cost factor
    fn validate_bcrypt_cost(cost: u32) -> Result<(), ServiceError> {
        if !BCRYPT_COST_RANGE.contains(&cost) {
            return Err(ServiceError::ConfigurationError(format!(
                "Invalid BCRYPT_COST {}: must be between {} and {}",
                cost,
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            )));
        }
        Ok(())
    }

    /// Validate log level
    fn validate_log_level(level: &str) -> Result<(), ServiceError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(ServiceError::ConfigurationError(
                format!("Invalid LOG_LEVEL '{}': must be one of {}", level, valid_levels.join(", "))
            ));
        }
        Ok(())
    }

    /// Validate log format
    fn validate_log_format(format: &str) -> Result<(), ServiceError> {
        if format != "json" && format != "text" {
            return Err(ServiceError::ConfigurationError(
                format!("Invalid LOG_FORMAT '{}': must be 'json' or 'text'", format)
            ));
        }
        Ok(())
    }
}

/// Strip credentials from a URL before it goes into an error message
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable>".to_string(),
    }
}

impl Config {
    /// Create a test configuration for unit tests
    ///
    /// This bypasses environment variable loading and validation
    /// for use in tests that don't need real configuration.
    pub fn test_config() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            database_url: "postgresql://localhost/test".to_string(),
            db_max_connections: 10,
            jwt_secret: Secret::new("test-jwt-secret".to_string()),
            verification_base_url: "http://localhost:3000".to_string(),
            upload_dir: std::env::temp_dir().join("certificate-registry-test-uploads"),
            require_auth_for_create: false,
            bcrypt_cost: 4, // Minimum cost keeps tests fast
            request_timeout_secs: 30,
            body_size_limit_bytes: 10 * 1024 * 1024,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}
