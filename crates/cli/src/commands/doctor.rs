use deadline_core::config::{AppConfig, LoadOptions};
use deadline_core::sources::decode_document;
use deadline_core::{DocumentFetcher, HttpDocumentFetcher, SOURCE_CATALOG};
use serde::Serialize;

use super::{escape_json, CommandResult, EXIT_CONFIG_FAILURE, EXIT_RUNTIME_FAILURE};

/// Source probed by the reachability check.
const PROBE_SOURCE: &str = "iclr";

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
    let exit_code = exit_code_for(&report);

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult::raw(exit_code, output);
    }

    CommandResult::raw(exit_code, render_human(&report))
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
            checks.push(check_signature_mode(&config));
            checks.push(check_source_reachability(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "signature_verification",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "source_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn exit_code_for(report: &DoctorReport) -> u8 {
    let failed = |name: &str| {
        report.checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
    };

    if failed("config_validation") {
        EXIT_CONFIG_FAILURE
    } else if report.overall_status == CheckStatus::Fail {
        EXIT_RUNTIME_FAILURE
    } else {
        0
    }
}

fn check_signature_mode(config: &AppConfig) -> DoctorCheck {
    if config.verifies_signatures() {
        DoctorCheck {
            name: "signature_verification",
            status: CheckStatus::Pass,
            details: "slash commands must carry a valid Slack signature".to_string(),
        }
    } else {
        DoctorCheck {
            name: "signature_verification",
            status: CheckStatus::Skipped,
            details: "slack.signing_secret is unset; requests are accepted unverified".to_string(),
        }
    }
}

fn check_source_reachability(config: &AppConfig) -> DoctorCheck {
    let name = "source_reachability";
    let fetcher = match HttpDocumentFetcher::from_config(&config.source) {
        Ok(fetcher) => fetcher,
        Err(error) => return DoctorCheck { name, status: CheckStatus::Fail, details: error.to_string() },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name,
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let body = fetcher.fetch_document(PROBE_SOURCE).await?;
        decode_document(PROBE_SOURCE, &body)
    });

    match result {
        Ok(records) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!(
                "fetched `{}` ({} records); {} sources in catalog",
                fetcher.document_url(PROBE_SOURCE),
                records.len(),
                SOURCE_CATALOG.len()
            ),
        },
        Err(error) => DoctorCheck { name, status: CheckStatus::Fail, details: error.to_string() },
    }
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
