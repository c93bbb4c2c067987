//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use veggie_lens_adapters::history::SqliteHistoryStore;
use veggie_lens_domain::Locale;

use crate::args::DoctorArgs;
use crate::commands::predict::resolve_generation_provider;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    classifier: CheckResult,
    recommendation: CheckResult,
    database: CheckResult,
    uploads: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        classifier: CheckResult::error("Not checked"),
        recommendation: CheckResult::error("Not checked"),
        database: CheckResult::error("Not checked"),
        uploads: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    match AppConfig::load(config_path.as_deref()) {
        Ok(config) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            report.classifier = check_classifier(&config);
            report.recommendation = check_recommendation(&config);
            report.database = check_database(&config).await;
            report.uploads = check_upload_dir(&config.server.upload_dir);
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
        }
    }

    let checks = [
        &report.config,
        &report.classifier,
        &report.recommendation,
        &report.database,
        &report.uploads,
    ];

    report.overall = if checks.iter().any(|c| c.is_error()) {
        "error".to_string()
    } else if checks.iter().all(|c| c.is_ok()) {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_classifier(config: &AppConfig) -> CheckResult {
    let classifier = &config.classifier;

    match classifier.provider.as_str() {
        "stub" => CheckResult::warn("Provider: stub (every image is a carrot)"),
        "http" if classifier.base_url.trim().is_empty() => {
            CheckResult::error("Classifier base_url is empty")
        }
        "http" => CheckResult::ok(format!(
            "Provider: http, base_url: {}, timeout: {}s",
            classifier.base_url, classifier.timeout_secs
        )),
        other => CheckResult::error(format!("Unknown classifier provider: {}", other)),
    }
}

fn check_recommendation(config: &AppConfig) -> CheckResult {
    let rec = &config.recommendation;

    if let Err(e) = rec.locale.parse::<Locale>() {
        return CheckResult::error(e);
    }

    if !rec.enabled {
        return CheckResult::warn("Recommendations disabled, responses use the fallback text");
    }

    let provider = match resolve_generation_provider(config) {
        Ok(p) => p,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    let details = serde_json::json!({
        "configured": rec.provider,
        "resolved": provider,
        "locale": rec.locale,
    });

    let result = match provider {
        "hosted" => {
            let env_var = &rec.hosted.api_key_env;
            if env_var.trim().is_empty() {
                CheckResult::error("No API key env var configured for hosted provider")
            } else if key_is_set(env_var) {
                CheckResult::ok(format!(
                    "Provider: hosted, Model: {}, API key: {} (set)",
                    rec.model, env_var
                ))
            } else {
                CheckResult::error(format!(
                    "Provider: hosted, Model: {}, API key: {} (not set)",
                    rec.model, env_var
                ))
            }
        }
        "local" => CheckResult::ok(format!(
            "Provider: local, Model: {}, base_url: {}",
            rec.local.model, rec.local.base_url
        )),
        _ => CheckResult::warn("Provider: stub (catalog fallback only)"),
    };

    result.with_details(details)
}

fn key_is_set(env_var: &str) -> bool {
    std::env::var(env_var)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

async fn check_database(config: &AppConfig) -> CheckResult {
    let url = match config.database.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return CheckResult::warn("No database configured, history is not persisted"),
    };

    let store = match SqliteHistoryStore::new(url).await {
        Ok(store) => store,
        Err(e) => return CheckResult::error(format!("Failed to open {}: {}", url, e)),
    };

    match store.ping().await {
        Ok(()) => CheckResult::ok(format!("SQLite: {}", url)),
        Err(e) => CheckResult::error(format!("SQLite {} not usable: {}", url, e)),
    }
}

fn check_upload_dir(dir: &Path) -> CheckResult {
    if !dir.exists() {
        return CheckResult::warn(format!(
            "Upload directory will be created on first upload: {}",
            dir.display()
        ));
    }

    match std::fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            CheckResult::error(format!("Upload path is not a directory: {}", dir.display()))
        }
        Ok(meta) if meta.permissions().readonly() => {
            CheckResult::error(format!("Upload directory is read-only: {}", dir.display()))
        }
        Ok(_) => CheckResult::ok(format!("Upload directory: {}", dir.display())),
        Err(e) => CheckResult::error(format!("Cannot inspect {}: {}", dir.display(), e)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("veggie-lens Doctor Report");
    println!("=========================");
    println!();

    print_check("Config", &report.config);
    print_check("Classifier", &report.classifier);
    print_check("Recommendation", &report.recommendation);
    print_check("Database", &report.database);
    print_check("Uploads", &report.uploads);

    println!();
    println!(
        "{} Overall: {}",
        symbol(&report.overall),
        report.overall.to_uppercase()
    );

    if report.overall == "ok" {
        println!();
        println!("Ready to serve! Try: veggie-lens serve");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    println!("{} {}: {}", symbol(&result.status), name, result.message);
}

fn symbol(status: &str) -> &'static str {
    match status {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    }
}
