//! Maps account and install names to directory identifiers.
//!
//! Both lookup tables are fetched once, in full, before any directive is
//! looked at. A directive is either fully resolved or left out entirely;
//! unresolved names are reported once per kind, not once per occurrence.

use crate::audit::AuditSink;
use crate::directory::{Directory, DirectoryError};
use crate::error::UsersyncError;
use crate::types::{Directive, NamedEntity, ResolvedDirective};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// InstallScope
// ---------------------------------------------------------------------------

/// How far an unresolved install name reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallScope {
    /// Only the directive naming the missing install is dropped.
    #[default]
    PerDirective,
    /// Once any install name fails to resolve, every later `Add` in the batch
    /// is dropped as well.
    Batch,
}

impl InstallScope {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallScope::PerDirective => "per_directive",
            InstallScope::Batch => "batch",
        }
    }
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstallScope {
    type Err = UsersyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_directive" => Ok(InstallScope::PerDirective),
            "batch" => Ok(InstallScope::Batch),
            _ => Err(UsersyncError::InvalidInstallScope(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ResolutionError / Resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Failed to fetch accounts: {0}")]
    AccountsUnavailable(DirectoryError),

    #[error("Failed to fetch installs: {0}")]
    InstallsUnavailable(DirectoryError),

    #[error("Cannot find account names: {}", .0.join(", "))]
    UnknownAccounts(Vec<String>),

    #[error("Cannot find install names: {}", .0.join(", "))]
    UnknownInstalls(Vec<String>),
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub resolved: Vec<ResolvedDirective>,
    pub errors: Vec<ResolutionError>,
}

impl Resolution {
    fn failed(error: ResolutionError) -> Self {
        Self {
            resolved: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Any resolution error makes the whole batch unusable.
    pub fn into_result(self) -> crate::Result<Vec<ResolvedDirective>> {
        if self.errors.is_empty() {
            Ok(self.resolved)
        } else {
            Err(UsersyncError::Resolution(self.errors))
        }
    }
}

// ---------------------------------------------------------------------------
// NameTables
// ---------------------------------------------------------------------------

/// name → id for accounts and installs.
#[derive(Debug, Clone, Default)]
pub struct NameTables {
    accounts: HashMap<String, String>,
    installs: HashMap<String, String>,
}

/// Outcome of looking up a single directive.
enum Lookup {
    Resolved(ResolvedDirective),
    MissingAccount(String),
    MissingInstalls(Vec<String>),
}

impl NameTables {
    pub fn new(accounts: Vec<NamedEntity>, installs: Vec<NamedEntity>) -> Self {
        let table = |entities: Vec<NamedEntity>| {
            entities
                .into_iter()
                .map(|e| (e.name, e.id))
                .collect::<HashMap<_, _>>()
        };
        Self {
            accounts: table(accounts),
            installs: table(installs),
        }
    }

    pub fn fetch(directory: &dyn Directory) -> Result<Self, ResolutionError> {
        let accounts = directory
            .list_accounts()
            .map_err(ResolutionError::AccountsUnavailable)?;
        let installs = directory
            .list_installs()
            .map_err(ResolutionError::InstallsUnavailable)?;
        tracing::debug!(
            accounts = accounts.len(),
            installs = installs.len(),
            "fetched name tables"
        );
        Ok(Self::new(accounts, installs))
    }

    fn lookup(&self, directive: &Directive) -> Lookup {
        let member = directive.member();
        let Some(account_id) = self.accounts.get(&member.account_name) else {
            return Lookup::MissingAccount(member.account_name.clone());
        };
        let account_id = account_id.clone();

        match directive {
            Directive::Remove { member } => Lookup::Resolved(ResolvedDirective::Remove {
                member: member.clone(),
                account_id,
            }),
            Directive::Add {
                member,
                install_names,
            } => {
                let mut install_ids = Vec::with_capacity(install_names.len());
                let mut missing = Vec::new();
                for name in install_names.iter().filter(|n| !n.is_empty()) {
                    match self.installs.get(name) {
                        Some(id) => install_ids.push(id.clone()),
                        None => missing.push(name.clone()),
                    }
                }
                if !missing.is_empty() {
                    return Lookup::MissingInstalls(missing);
                }
                Lookup::Resolved(ResolvedDirective::Add {
                    member: member.clone(),
                    account_id,
                    install_ids,
                })
            }
        }
    }

    /// Resolve every directive, in input order.
    pub fn resolve(&self, directives: &[Directive], scope: InstallScope) -> Resolution {
        let mut resolution = Resolution::default();
        let mut unknown_accounts = BTreeSet::new();
        let mut unknown_installs = BTreeSet::new();

        for directive in directives {
            match self.lookup(directive) {
                Lookup::MissingAccount(name) => {
                    unknown_accounts.insert(name);
                }
                Lookup::MissingInstalls(missing) => {
                    unknown_installs.extend(missing);
                }
                Lookup::Resolved(resolved) => {
                    let suppressed = scope == InstallScope::Batch
                        && matches!(resolved, ResolvedDirective::Add { .. })
                        && !unknown_installs.is_empty();
                    if suppressed {
                        tracing::debug!(
                            email = %resolved.member().email,
                            "dropping directive after an earlier unresolved install"
                        );
                    } else {
                        resolution.resolved.push(resolved);
                    }
                }
            }
        }

        if !unknown_accounts.is_empty() {
            resolution.errors.push(ResolutionError::UnknownAccounts(
                unknown_accounts.into_iter().collect(),
            ));
        }
        if !unknown_installs.is_empty() {
            resolution.errors.push(ResolutionError::UnknownInstalls(
                unknown_installs.into_iter().collect(),
            ));
        }
        resolution
    }
}

/// Fetch both name tables and resolve `directives` against them.
///
/// Failing to fetch either table yields a single error and nothing resolved.
/// Every error is also written to `audit`.
pub fn resolve(
    directory: &dyn Directory,
    directives: &[Directive],
    scope: InstallScope,
    audit: &mut dyn AuditSink,
) -> Resolution {
    let resolution = match NameTables::fetch(directory) {
        Ok(tables) => tables.resolve(directives, scope),
        Err(e) => Resolution::failed(e),
    };
    for e in &resolution.errors {
        tracing::error!("{e}");
        audit.error(&e.to_string());
    }
    resolution
}
