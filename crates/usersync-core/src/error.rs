use crate::resolver::ResolutionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsersyncError {
    #[error("invalid CSV structure: required columns are {0}")]
    InvalidStructure(String),

    #[error("input contains no valid rows")]
    EmptyInput,

    #[error("invalid action '{0}': must be 'add' or 'remove'")]
    InvalidAction(String),

    #[error("invalid install scope '{0}': must be 'per_directive' or 'batch'")]
    InvalidInstallScope(String),

    #[error("{}", join_errors(.0))]
    Resolution(Vec<ResolutionError>),

    #[error("settings file not found: {0}")]
    SettingsNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

fn join_errors(errors: &[ResolutionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, UsersyncError>;
