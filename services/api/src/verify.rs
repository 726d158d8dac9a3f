//! One-shot verification checks for the deployed intake pipeline.
//!
//! The count check reads the submission store directly; the API check drives
//! the HTTP endpoint with a clearly-labeled synthetic enquiry. Each holds its
//! resources only for the duration of the single operation, and only
//! process-level failures (store unreachable, network error, non-JSON
//! response) exit non-zero. An endpoint-reported validation error is a valid
//! response to print.

use std::fmt;
use std::path::PathBuf;

use clap::Args;
use serde_json::{json, Value};

use lourdes_intake::config::AppConfig;
use lourdes_intake::error::AppError;
use lourdes_intake::intake::{EnquiryRepository, SqliteEnquiryRepository};

#[derive(Args, Debug)]
pub(crate) struct CountCheckArgs {
    /// Path to the submission database (defaults to APP_DATABASE_PATH)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ApiCheckArgs {
    /// Intake endpoint URL (defaults to the configured host and port)
    #[arg(long)]
    pub(crate) url: Option<String>,
}

/// Print `SUBMISSION_COUNT:<n>` for the configured store.
///
/// Refuses to run without a database path: the in-memory development store
/// is process-local, so a count read from a fresh connection would always be
/// zero regardless of what the service has accepted. The store is opened
/// read-only so a mistyped path fails instead of creating an empty database.
pub(crate) fn run_count_check(args: CountCheckArgs) -> Result<(), AppError> {
    let path = match args.database {
        Some(path) => path,
        None => AppConfig::load()?.storage.require_database_path()?.clone(),
    };

    // Connection is scoped to this call and dropped on every exit path.
    let repository = SqliteEnquiryRepository::open_read_only(&path)?;
    let count = repository.count()?;
    println!("{}", count_line(count));
    Ok(())
}

pub(crate) fn count_line(count: u64) -> String {
    format!("SUBMISSION_COUNT:{count}")
}

/// POST one synthetic enquiry and pretty-print whatever JSON comes back.
///
/// A check failure is reported once, as the `API_FAILED:` tag on stderr,
/// and ends the process directly so the tag is the whole report.
pub(crate) async fn run_api_check(args: ApiCheckArgs) -> Result<(), AppError> {
    let url = match args.url {
        Some(url) => url,
        None => {
            let config = AppConfig::load()?;
            format!(
                "http://{}:{}/api/contact",
                config.server.host, config.server.port
            )
        }
    };

    match post_synthetic_enquiry(&url).await {
        Ok(body) => {
            let pretty =
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
            println!("API_RESPONSE:");
            println!("{pretty}");
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", failure_tag(&err));
            std::process::exit(1);
        }
    }
}

fn failure_tag(details: &impl fmt::Display) -> String {
    format!("API_FAILED:{details}")
}

async fn post_synthetic_enquiry(url: &str) -> Result<Value, CheckError> {
    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .json(&synthetic_payload())
        .send()
        .await
        .map_err(CheckError::Request)?;

    response.json::<Value>().await.map_err(CheckError::Response)
}

/// Payload labeled so operators can spot verification traffic in the store.
pub(crate) fn synthetic_payload() -> Value {
    json!({
        "name": "Antigravity Pre-Launch",
        "email": "verification@antigravity.ai",
        "phone": "1234567890",
        "subject": "Pre-Launch Verification",
        "message": "This is an automated verification of the contact enquiry intake pipeline.",
    })
}

/// API-check failure: the request never completed, or the body was not JSON.
#[derive(Debug)]
enum CheckError {
    Request(reqwest::Error),
    Response(reqwest::Error),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Request(err) => write!(f, "request failed: {err}"),
            CheckError::Response(err) => write!(f, "response was not JSON: {err}"),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Request(err) | CheckError::Response(err) => Some(err),
        }
    }
}
