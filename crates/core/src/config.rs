use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::pricing::DEFAULT_TAX_RATE;
use crate::catalog::query::DEFAULT_PAGE_SIZE;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub product_service: ProductServiceConfig,
    pub catalog: CatalogConfig,
    pub cart: CartConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ProductServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub customer_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub page_size: u32,
}

#[derive(Clone, Debug)]
pub struct CartConfig {
    pub tax_rate: Decimal,
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub product_service_url: Option<String>,
    pub product_service_timeout_secs: Option<u64>,
    pub customer_token: Option<String>,
    pub page_size: Option<u32>,
    pub tax_rate: Option<Decimal>,
    pub currency: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            product_service: ProductServiceConfig {
                base_url: "http://localhost:4000".to_string(),
                timeout_secs: 10,
                customer_token: None,
            },
            catalog: CatalogConfig { page_size: DEFAULT_PAGE_SIZE },
            cart: CartConfig { tax_rate: DEFAULT_TAX_RATE, currency: "USD".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("parcel.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(product_service) = patch.product_service {
            if let Some(base_url) = product_service.base_url {
                self.product_service.base_url = base_url;
            }
            if let Some(timeout_secs) = product_service.timeout_secs {
                self.product_service.timeout_secs = timeout_secs;
            }
            if let Some(customer_token_value) = product_service.customer_token {
                self.product_service.customer_token = Some(secret_value(customer_token_value));
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(page_size) = catalog.page_size {
                self.catalog.page_size = page_size;
            }
        }

        if let Some(cart) = patch.cart {
            if let Some(tax_rate) = cart.tax_rate {
                self.cart.tax_rate = tax_rate;
            }
            if let Some(currency) = cart.currency {
                self.cart.currency = currency;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PARCEL_PRODUCT_SERVICE_BASE_URL") {
            self.product_service.base_url = value;
        }
        if let Some(value) = read_env("PARCEL_PRODUCT_SERVICE_TIMEOUT_SECS") {
            self.product_service.timeout_secs =
                parse_u64("PARCEL_PRODUCT_SERVICE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("PARCEL_CUSTOMER_TOKEN") {
            self.product_service.customer_token = Some(secret_value(value));
        }

        if let Some(value) = read_env("PARCEL_CATALOG_PAGE_SIZE") {
            self.catalog.page_size = parse_u32("PARCEL_CATALOG_PAGE_SIZE", &value)?;
        }

        if let Some(value) = read_env("PARCEL_CART_TAX_RATE") {
            self.cart.tax_rate = parse_decimal("PARCEL_CART_TAX_RATE", &value)?;
        }
        if let Some(value) = read_env("PARCEL_CART_CURRENCY") {
            self.cart.currency = value;
        }

        let log_level = read_env("PARCEL_LOGGING_LEVEL").or_else(|| read_env("PARCEL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PARCEL_LOGGING_FORMAT").or_else(|| read_env("PARCEL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.product_service_url {
            self.product_service.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.product_service_timeout_secs {
            self.product_service.timeout_secs = timeout_secs;
        }
        if let Some(customer_token) = overrides.customer_token {
            self.product_service.customer_token = Some(secret_value(customer_token));
        }
        if let Some(page_size) = overrides.page_size {
            self.catalog.page_size = page_size;
        }
        if let Some(tax_rate) = overrides.tax_rate {
            self.cart.tax_rate = tax_rate;
        }
        if let Some(currency) = overrides.currency {
            self.cart.currency = currency;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_product_service(&self.product_service)?;
        validate_catalog(&self.catalog)?;
        validate_cart(&self.cart)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("parcel.toml"), PathBuf::from("config/parcel.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_product_service(product_service: &ProductServiceConfig) -> Result<(), ConfigError> {
    let base_url = product_service.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "product_service.base_url must start with http:// or https://".to_string(),
        ));
    }

    if product_service.timeout_secs == 0 || product_service.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "product_service.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    let blank_token = product_service
        .customer_token
        .as_ref()
        .map(|token| token.expose_secret().trim().is_empty())
        .unwrap_or(false);
    if blank_token {
        return Err(ConfigError::Validation(
            "product_service.customer_token must not be blank when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.page_size == 0 {
        return Err(ConfigError::Validation(
            "catalog.page_size must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_cart(cart: &CartConfig) -> Result<(), ConfigError> {
    if cart.tax_rate < Decimal::ZERO || cart.tax_rate > Decimal::ONE {
        return Err(ConfigError::Validation(
            "cart.tax_rate must be a fraction in range 0..=1 (0.10 means 10%)".to_string(),
        ));
    }

    let currency = cart.currency.trim();
    if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(ConfigError::Validation(
            "cart.currency must be a three-letter uppercase ISO code such as USD".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    product_service: Option<ProductServicePatch>,
    catalog: Option<CatalogPatch>,
    cart: Option<CartPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductServicePatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    customer_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct CartPatch {
    tax_rate: Option<Decimal>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
