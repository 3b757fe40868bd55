//! Diffs each resolved directive against its account's current users and
//! applies the resulting change.
//!
//! Directives run one at a time, in input order. A failure is recorded
//! against the user's email and processing moves on; only the aggregate
//! success flag remembers it.

use crate::audit::{ActionRecord, AuditSink};
use crate::directory::{Directory, DirectoryResult, NewUser, UserUpdate};
use crate::snapshot::{Snapshot, SnapshotCache};
use crate::types::{ExecutionOutcome, Outcome, ResolvedDirective};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Options / report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ExecuteOptions {
    /// Suppress every mutating call; reporting is unchanged.
    pub dry_run: bool,
    /// Reuse an account's snapshot until something in that account changes.
    pub cache_snapshots: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            cache_snapshots: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped_not_found: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub outcomes: Vec<ExecutionOutcome>,
}

impl ExecutionReport {
    /// True unless some directive failed. Not-found removals do not count.
    pub fn success(&self) -> bool {
        !self.outcomes.iter().any(|o| o.outcome.is_failure())
    }

    pub fn mutations_issued(&self) -> usize {
        self.outcomes.iter().filter(|o| o.mutation_issued).count()
    }

    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for o in &self.outcomes {
            let slot = match o.outcome {
                Outcome::Added => &mut counts.added,
                Outcome::Updated => &mut counts.updated,
                Outcome::Removed => &mut counts.removed,
                Outcome::SkippedNotFound => &mut counts.skipped_not_found,
                Outcome::Failed(_) => &mut counts.failed,
            };
            *slot += 1;
        }
        counts
    }
}

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// The single change a directive calls for, given the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Create(NewUser),
    Update { user_id: String, update: UserUpdate },
    Delete { user_id: String },
    NotFound,
}

impl Change {
    fn outcome(&self) -> Outcome {
        match self {
            Change::Create(_) => Outcome::Added,
            Change::Update { .. } => Outcome::Updated,
            Change::Delete { .. } => Outcome::Removed,
            Change::NotFound => Outcome::SkippedNotFound,
        }
    }
}

/// | action | in snapshot | change   |
/// |--------|-------------|----------|
/// | remove | yes         | delete   |
/// | remove | no          | not found|
/// | add    | yes         | update   |
/// | add    | no          | create   |
pub fn decide(directive: &ResolvedDirective, snapshot: &Snapshot) -> Change {
    let member = directive.member();
    let existing = snapshot.get(&member.email);
    match (directive, existing) {
        (ResolvedDirective::Remove { .. }, Some(user)) => Change::Delete {
            user_id: user.id.clone(),
        },
        (ResolvedDirective::Remove { .. }, None) => Change::NotFound,
        (ResolvedDirective::Add { install_ids, .. }, Some(user)) => Change::Update {
            user_id: user.id.clone(),
            update: UserUpdate {
                first_name: member.first_name.clone(),
                last_name: member.last_name.clone(),
                roles: member.roles.clone(),
                install_ids: install_ids.clone(),
            },
        },
        (ResolvedDirective::Add { install_ids, .. }, None) => Change::Create(NewUser {
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            email: member.email.clone(),
            roles: member.roles.clone(),
            install_ids: install_ids.clone(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

pub struct Executor<'a> {
    directory: &'a dyn Directory,
    audit: &'a mut dyn AuditSink,
    dry_run: bool,
    snapshots: SnapshotCache,
}

impl<'a> Executor<'a> {
    pub fn new(
        directory: &'a dyn Directory,
        audit: &'a mut dyn AuditSink,
        options: ExecuteOptions,
    ) -> Self {
        Self {
            directory,
            audit,
            dry_run: options.dry_run,
            snapshots: SnapshotCache::new(options.cache_snapshots),
        }
    }

    pub fn run(mut self, directives: &[ResolvedDirective]) -> ExecutionReport {
        let outcomes = directives.iter().map(|d| self.apply(d)).collect();
        ExecutionReport { outcomes }
    }

    /// Apply one directive: at most one mutating call, exactly one action record.
    pub fn apply(&mut self, directive: &ResolvedDirective) -> ExecutionOutcome {
        let member = directive.member();
        let account_id = directive.account_id();

        let change = match self
            .snapshots
            .get_or_fetch(self.directory, account_id)
            .map(|snapshot| decide(directive, snapshot))
        {
            Ok(change) => change,
            Err(e) => {
                let reason = format!("Error processing user {}: {e}", member.email);
                return self.finish(directive, Outcome::Failed(reason), false);
            }
        };

        if change == Change::NotFound {
            self.audit.error(&format!(
                "User {} not found in account {}",
                member.email, member.account_name
            ));
            return self.finish(directive, Outcome::SkippedNotFound, false);
        }

        if self.dry_run {
            let outcome = change.outcome();
            return self.finish(directive, outcome, false);
        }

        let result = self.issue(account_id, &change);
        self.snapshots.invalidate(account_id);
        let outcome = match result {
            Ok(()) => change.outcome(),
            Err(e) => Outcome::Failed(format!("Error processing user {}: {e}", member.email)),
        };
        self.finish(directive, outcome, true)
    }

    fn issue(&self, account_id: &str, change: &Change) -> DirectoryResult<()> {
        match change {
            Change::Create(user) => self.directory.create_user(account_id, user),
            Change::Update { user_id, update } => {
                self.directory.update_user(account_id, user_id, update)
            }
            Change::Delete { user_id } => self.directory.delete_user(account_id, user_id),
            Change::NotFound => Ok(()),
        }
    }

    fn finish(
        &mut self,
        directive: &ResolvedDirective,
        outcome: Outcome,
        mutation_issued: bool,
    ) -> ExecutionOutcome {
        let member = directive.member();
        if let Outcome::Failed(reason) = &outcome {
            tracing::error!(email = %member.email, "{reason}");
            self.audit.error(reason);
        } else {
            tracing::info!(
                email = %member.email,
                account = %member.account_name,
                outcome = outcome.label(),
                dry_run = self.dry_run,
                "processed directive"
            );
        }
        self.audit.record_action(&ActionRecord::now(
            &member.email,
            &member.account_name,
            outcome.label(),
        ));
        ExecutionOutcome {
            email: member.email.clone(),
            account_name: member.account_name.clone(),
            outcome,
            mutation_issued,
        }
    }
}

/// Run every directive through a fresh [`Executor`].
pub fn execute(
    directory: &dyn Directory,
    directives: &[ResolvedDirective],
    options: ExecuteOptions,
    audit: &mut dyn AuditSink,
) -> ExecutionReport {
    Executor::new(directory, audit, options).run(directives)
}
