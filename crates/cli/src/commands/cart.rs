use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use parcel_client::CartSummary;
use parcel_core::cart::pricing::{CartPricer, DeterministicCartPricer};
use parcel_core::config::{AppConfig, LoadOptions};
use parcel_core::{CartEntry, CartLedger, DomainError};

use super::{CommandResult, EXIT_CONFIG, EXIT_INPUT};

pub fn run(file: &Path, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("cart", "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    let ledger = match read_ledger(file) {
        Ok(ledger) => ledger,
        Err(error) => {
            return CommandResult::failure("cart", "invalid_input", format!("{error:#}"), EXIT_INPUT)
        }
    };

    let summary = match summarize(&ledger, &config) {
        Ok(summary) => summary,
        Err(error) => {
            return CommandResult::failure("cart", "invalid_input", error.to_string(), EXIT_INPUT)
        }
    };

    let headline = format!(
        "{} items, total {} {}",
        summary.item_count, summary.totals.total, summary.currency
    );
    if json_output {
        return CommandResult::success_with_data("cart", headline, summary);
    }

    CommandResult::text(render_human(&summary, &headline))
}

fn summarize(ledger: &CartLedger, config: &AppConfig) -> Result<CartSummary, DomainError> {
    let pricer = DeterministicCartPricer::new(config.cart.tax_rate);
    Ok(CartSummary {
        entries: ledger.entries().to_vec(),
        item_count: ledger.item_count(),
        totals: pricer.price(ledger)?.rounded(),
        breakdown: ledger.chart_breakdown()?,
        currency: config.cart.currency.clone(),
    })
}

/// Reads a saved cart: a JSON array of `{ product, quantity }` entries.
fn read_ledger(path: &Path) -> anyhow::Result<CartLedger> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read `{}`", path.display()))?;
    let ledger: CartLedger = serde_json::from_str(&raw)
        .with_context(|| format!("could not parse `{}`", path.display()))?;

    validate_entries(ledger.entries())?;
    Ok(ledger)
}

fn validate_entries(entries: &[CartEntry]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if entry.quantity == 0 {
            bail!("cart entry `{}` has quantity 0", entry.product.id.0);
        }
        entry.product.validate()?;
        if !seen.insert(&entry.product.id) {
            bail!("product `{}` appears in more than one entry", entry.product.id.0);
        }
    }
    Ok(())
}

fn render_human(summary: &CartSummary, headline: &str) -> String {
    let mut lines = vec![headline.to_string()];
    for slice in &summary.breakdown {
        lines.push(format!("- {}: {}", slice.name, slice.value));
    }
    lines.push(format!("subtotal = {}", summary.totals.subtotal));
    lines.push(format!("tax ({}) = {}", summary.totals.tax_rate, summary.totals.tax));
    lines.push(format!("total = {}", summary.totals.total));
    lines.join("\n")
}
