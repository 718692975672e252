use std::env;
use std::fs;
use std::path::Path;

use parcel_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key_path, field.value));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let customer_token = config
        .product_service
        .customer_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        Field {
            key_path: "product_service.base_url",
            env_keys: &["PARCEL_PRODUCT_SERVICE_BASE_URL"],
            value: config.product_service.base_url.clone(),
        },
        Field {
            key_path: "product_service.timeout_secs",
            env_keys: &["PARCEL_PRODUCT_SERVICE_TIMEOUT_SECS"],
            value: config.product_service.timeout_secs.to_string(),
        },
        Field {
            key_path: "product_service.customer_token",
            env_keys: &["PARCEL_CUSTOMER_TOKEN"],
            value: customer_token,
        },
        Field {
            key_path: "catalog.page_size",
            env_keys: &["PARCEL_CATALOG_PAGE_SIZE"],
            value: config.catalog.page_size.to_string(),
        },
        Field {
            key_path: "cart.tax_rate",
            env_keys: &["PARCEL_CART_TAX_RATE"],
            value: config.cart.tax_rate.to_string(),
        },
        Field {
            key_path: "cart.currency",
            env_keys: &["PARCEL_CART_CURRENCY"],
            value: config.cart.currency.clone(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["PARCEL_LOGGING_LEVEL", "PARCEL_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["PARCEL_LOGGING_FORMAT", "PARCEL_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

/// Blank values are ignored by the loader, so they do not count as a source.
fn env_is_set(key: &str) -> bool {
    env::var(key).is_ok_and(|value| !value.trim().is_empty())
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps the first four characters of a token so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.char_indices().nth(4) {
        Some((cut, _)) if trimmed.len() > 8 => format!("{}***", &trimmed[..cut]),
        _ => "<redacted>".to_string(),
    }
}
