use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Add,
    Remove,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Remove => "remove",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = crate::error::UsersyncError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Action::Add),
            "remove" => Ok(Action::Remove),
            other => Err(crate::error::UsersyncError::InvalidAction(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Member / Directive
// ---------------------------------------------------------------------------

/// The user profile fields every input row carries, whatever its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub account_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Order and duplicates preserved as given.
    pub roles: Vec<String>,
}

/// One desired-state statement from one input row.
///
/// Install names only exist on `Add`; removal never needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Directive {
    Add {
        #[serde(flatten)]
        member: Member,
        install_names: Vec<String>,
    },
    Remove {
        #[serde(flatten)]
        member: Member,
    },
}

impl Directive {
    pub fn action(&self) -> Action {
        match self {
            Directive::Add { .. } => Action::Add,
            Directive::Remove { .. } => Action::Remove,
        }
    }

    pub fn member(&self) -> &Member {
        match self {
            Directive::Add { member, .. } | Directive::Remove { member } => member,
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedDirective
// ---------------------------------------------------------------------------

/// A [`Directive`] whose account (and, for `Add`, every install) resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResolvedDirective {
    Add {
        #[serde(flatten)]
        member: Member,
        account_id: String,
        install_ids: Vec<String>,
    },
    Remove {
        #[serde(flatten)]
        member: Member,
        account_id: String,
    },
}

impl ResolvedDirective {
    pub fn action(&self) -> Action {
        match self {
            ResolvedDirective::Add { .. } => Action::Add,
            ResolvedDirective::Remove { .. } => Action::Remove,
        }
    }

    pub fn member(&self) -> &Member {
        match self {
            ResolvedDirective::Add { member, .. } | ResolvedDirective::Remove { member, .. } => {
                member
            }
        }
    }

    pub fn account_id(&self) -> &str {
        match self {
            ResolvedDirective::Add { account_id, .. }
            | ResolvedDirective::Remove { account_id, .. } => account_id,
        }
    }

    /// Always empty for `Remove`.
    pub fn install_ids(&self) -> &[String] {
        match self {
            ResolvedDirective::Add { install_ids, .. } => install_ids,
            ResolvedDirective::Remove { .. } => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// DirectoryUser
// ---------------------------------------------------------------------------

/// An existing user of one account, as reported by the remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub installs: Vec<String>,
}

/// A name→id pair as listed by the directory (accounts, installs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "kebab-case")]
pub enum Outcome {
    Added,
    Updated,
    Removed,
    SkippedNotFound,
    Failed(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Added => "added",
            Outcome::Updated => "updated",
            Outcome::Removed => "removed",
            Outcome::SkippedNotFound => "skipped-not-found",
            Outcome::Failed(_) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// What happened to one resolved directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub email: String,
    pub account_name: String,
    pub outcome: Outcome,
    /// False in dry-run, and whenever no mutation was attempted.
    pub mutation_issued: bool,
}
