use crate::cmd::RunStatus;
use crate::credentials;
use crate::output::{print_counts, print_json};
use crate::prompt;
use anyhow::Context;
use clap::{ArgAction, Args};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use usersync_core::config::{Settings, WarnLevel};
use usersync_core::executor::OutcomeCounts;
use usersync_core::{
    execute, loader, paths, resolve, AuditSink, Directory, ExecuteOptions, FileAuditSink,
    InstallScope,
};
use wpengine_api::{Client, ClientConfig};

#[derive(Args)]
pub struct SyncArgs {
    /// CSV file with one add/remove directive per row
    pub csv_file: PathBuf,

    /// API username
    #[arg(long, env = "WPENGINE_USERNAME")]
    pub api_username: Option<String>,

    /// API password
    #[arg(long, env = "WPENGINE_PASSWORD", hide_env_values = true)]
    pub api_password: Option<String>,

    /// API base URL (overrides api.base_url)
    #[arg(long, env = "WPENGINE_API_URL")]
    pub api_url: Option<String>,

    /// Ask for confirmation before making changes
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub ask_for_confirmation: bool,

    /// Report what would change without changing anything
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub dryrun: bool,

    /// Directory for the action and error logs (overrides logging.dir)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Scope of an unresolved install name: per_directive or batch
    #[arg(long)]
    pub install_scope: Option<InstallScope>,
}

#[derive(Serialize)]
struct SyncSummary<'a> {
    success: bool,
    dry_run: bool,
    processed: usize,
    mutations_issued: usize,
    #[serde(flatten)]
    counts: OutcomeCounts,
    actions_log: &'a Path,
    errors_log: &'a Path,
}

pub fn run(args: SyncArgs, settings: &Settings, json: bool) -> anyhow::Result<RunStatus> {
    let warnings = settings.validate();
    if let Some(w) = warnings.iter().find(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("invalid settings: {}", w.message);
    }

    let log_dir = args
        .log_dir
        .clone()
        .unwrap_or_else(|| settings.logging.dir.clone());
    let stamp = paths::run_stamp(&chrono::Local::now());
    let mut audit = FileAuditSink::open(&log_dir, &stamp, args.dryrun)
        .with_context(|| format!("failed to open log files in {}", log_dir.display()))?;
    for w in &warnings {
        tracing::warn!("{}", w.message);
        audit.warning(&w.message);
    }

    let result = reconcile(&args, settings, &mut audit, json);
    if let Err(e) = &result {
        audit.error(&format!("{e:#}"));
    }
    result
}

fn reconcile(
    args: &SyncArgs,
    settings: &Settings,
    audit: &mut FileAuditSink,
    json: bool,
) -> anyhow::Result<RunStatus> {
    let creds = credentials::resolve(args.api_username.clone(), args.api_password.clone())?;
    let client = Client::new(ClientConfig {
        base_url: args
            .api_url
            .clone()
            .unwrap_or_else(|| settings.api.base_url.clone()),
        username: creds.username,
        password: creds.password,
        page_size: settings.api.page_size,
        timeout: (settings.api.timeout_secs > 0)
            .then(|| Duration::from_secs(settings.api.timeout_secs)),
    })
    .context("failed to build API client")?;

    client
        .verify_access()
        .context("user can't be authenticated")?;

    let report = loader::load_path(&args.csv_file)
        .with_context(|| format!("invalid or empty CSV file: {}", args.csv_file.display()))?;
    for row in &report.rejected {
        audit.error(&format!("line {}: {}", row.line, row.message));
    }
    if !report.rejected.is_empty() {
        eprintln!(
            "warning: {} row(s) rejected, see {}",
            report.rejected.len(),
            audit.errors_path().display()
        );
    }

    let scope = args
        .install_scope
        .unwrap_or(settings.resolution.install_scope);
    let directives = resolve(&client, &report.directives, scope, audit)
        .into_result()
        .context("could not resolve account or install names")?;

    if args.ask_for_confirmation {
        println!("\nWill process {} users", directives.len());
        println!("Dry run: {}", args.dryrun);
        if !prompt::confirm("Do you want to proceed?")? {
            anyhow::bail!("operation cancelled by user");
        }
    }

    let options = ExecuteOptions {
        dry_run: args.dryrun,
        cache_snapshots: settings.execution.cache_snapshots,
    };
    let outcome = execute(&client, &directives, options, audit);
    let success = outcome.success();

    if json {
        print_json(&SyncSummary {
            success,
            dry_run: args.dryrun,
            processed: outcome.outcomes.len(),
            mutations_issued: outcome.mutations_issued(),
            counts: outcome.counts(),
            actions_log: audit.actions_path(),
            errors_log: audit.errors_path(),
        })?;
    } else {
        print_counts(&outcome.counts());
        if success {
            println!("Operation completed successfully");
        } else {
            println!(
                "Operation completed with errors. Please check the error log file: {}",
                audit.errors_path().display()
            );
        }
    }

    Ok(if success {
        RunStatus::Completed
    } else {
        RunStatus::CompletedWithErrors
    })
}
