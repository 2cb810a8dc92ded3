use anyhow::Context;
use bikerent_client::HttpRentalApi;
use bikerent_core::api::RentalApi;
use bikerent_core::config::{AppConfig, LoadOptions};
use bikerent_core::session::{FileSessionStore, SessionStore};
use serde::Serialize;

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

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
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
            checks.push(check_session_store(&config));
            checks.push(check_api_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["session_store", "api_reachability"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_session_store(config: &AppConfig) -> DoctorCheck {
    let store = FileSessionStore::new(&config.session.path);
    match store.get() {
        Ok(Some(_)) => DoctorCheck {
            name: "session_store",
            status: CheckStatus::Pass,
            details: format!("signed in (token in `{}`)", store.path().display()),
        },
        Ok(None) => DoctorCheck {
            name: "session_store",
            status: CheckStatus::Pass,
            details: format!("no active session at `{}`", store.path().display()),
        },
        Err(error) => DoctorCheck {
            name: "session_store",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_api_reachability(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "api_reachability",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    match runtime.block_on(probe_api(config)) {
        Ok(places) => DoctorCheck {
            name: "api_reachability",
            status: CheckStatus::Pass,
            details: format!("`{}` answered with {places} place(s)", config.api.base_url),
        },
        Err(error) => DoctorCheck {
            name: "api_reachability",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

async fn probe_api(config: &AppConfig) -> anyhow::Result<usize> {
    let api = HttpRentalApi::new(&config.api).context("failed to build api client")?;
    let places = api
        .list_places()
        .await
        .with_context(|| format!("failed to reach `{}`", config.api.base_url))?;
    Ok(places.len())
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
