use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const SETTINGS_FILE: &str = "usersync.yaml";

const ACTIONS_PREFIX: &str = "actions_";
const ERRORS_PREFIX: &str = "errors_";
const DRYRUN_SUFFIX: &str = "_dryrun";
const LOG_EXT: &str = "log";

/// `strftime` layout of the per-run stamp embedded in log file names.
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn run_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(RUN_STAMP_FORMAT).to_string()
}

pub fn actions_log_path(dir: &Path, stamp: &str, dry_run: bool) -> PathBuf {
    let suffix = if dry_run { DRYRUN_SUFFIX } else { "" };
    dir.join(format!("{ACTIONS_PREFIX}{stamp}{suffix}.{LOG_EXT}"))
}

pub fn errors_log_path(dir: &Path, stamp: &str) -> PathBuf {
    dir.join(format!("{ERRORS_PREFIX}{stamp}.{LOG_EXT}"))
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}
