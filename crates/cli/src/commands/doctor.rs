use parcel_client::StorefrontClient;
use parcel_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use super::{block_on, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = u8::from(report.overall_status == CheckStatus::Fail);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match StorefrontClient::from_config(&config.product_service) {
                Ok(client) => checks.extend(run_service_checks(&client, &config)),
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "product_service_reachability",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("customer_token", "product service client unavailable"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped(
                "product_service_reachability",
                "skipped because configuration did not load",
            ));
            checks.push(skipped("customer_token", "skipped because configuration did not load"));
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Pooled connections do not survive across runtimes, so both checks share one.
fn run_service_checks(client: &StorefrontClient, config: &AppConfig) -> Vec<DoctorCheck> {
    let checks = block_on(async {
        vec![
            check_catalog_reachability(client).await,
            check_customer_token(client, config).await,
        ]
    });

    checks.unwrap_or_else(|details| {
        vec![
            DoctorCheck { name: "product_service_reachability", status: CheckStatus::Fail, details },
            skipped("customer_token", "async runtime unavailable"),
        ]
    })
}

async fn check_catalog_reachability(client: &StorefrontClient) -> DoctorCheck {
    match client.fetch_categories().await {
        Ok(categories) => DoctorCheck {
            name: "product_service_reachability",
            status: CheckStatus::Pass,
            details: format!(
                "reached `{}` ({} categories listed)",
                client.base_url(),
                categories.len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "product_service_reachability",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

async fn check_customer_token(client: &StorefrontClient, config: &AppConfig) -> DoctorCheck {
    let Some(token) = &config.product_service.customer_token else {
        return skipped("customer_token", "no customer token configured");
    };

    match client.authenticate(token).await {
        Ok(customer) => DoctorCheck {
            name: "customer_token",
            status: CheckStatus::Pass,
            details: format!("token resolves to customer `{}`", customer.id.0),
        },
        Err(error) => DoctorCheck {
            name: "customer_token",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn skipped(name: &'static str, details: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: details.to_string() }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
