//! In-memory [`Directory`] used by the engine's unit tests.

use crate::directory::{Directory, DirectoryError, DirectoryResult, NewUser, UserUpdate};
use crate::types::{DirectoryUser, Member, NamedEntity};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListUsers(String),
    Create(String, NewUser),
    Update(String, String, UserUpdate),
    Delete(String, String),
}

#[derive(Default)]
pub struct FakeDirectory {
    pub accounts: Vec<NamedEntity>,
    pub installs: Vec<NamedEntity>,
    pub users: HashMap<String, Vec<DirectoryUser>>,
    pub fail_accounts: bool,
    pub fail_installs: bool,
    /// Account ids whose user listing fails.
    pub failing_listings: HashSet<String>,
    /// Emails whose mutation fails.
    pub failing_emails: HashSet<String>,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, id: &str, name: &str) -> Self {
        self.accounts.push(NamedEntity {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_install(mut self, id: &str, name: &str) -> Self {
        self.installs.push(NamedEntity {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_user(mut self, account_id: &str, user_id: &str, email: &str) -> Self {
        self.users
            .entry(account_id.into())
            .or_default()
            .push(DirectoryUser {
                id: user_id.into(),
                email: email.into(),
                roles: vec![],
                installs: vec![],
            });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c, Call::ListUsers(_)))
            .count()
    }

    pub fn listings(&self) -> usize {
        self.calls.borrow().len() - self.mutations()
    }

    fn fail(&self, email: &str) -> DirectoryResult<()> {
        if self.failing_emails.contains(email) {
            return Err(DirectoryError::Status {
                status: 500,
                message: "internal error".into(),
            });
        }
        Ok(())
    }

    fn email_of(&self, account_id: &str, user_id: &str) -> String {
        self.users
            .get(account_id)
            .and_then(|us| us.iter().find(|u| u.id == user_id))
            .map(|u| u.email.clone())
            .unwrap_or_default()
    }
}

impl Directory for FakeDirectory {
    fn verify_access(&self) -> DirectoryResult<()> {
        Ok(())
    }

    fn list_accounts(&self) -> DirectoryResult<Vec<NamedEntity>> {
        if self.fail_accounts {
            return Err(DirectoryError::Transport("connection refused".into()));
        }
        Ok(self.accounts.clone())
    }

    fn list_installs(&self) -> DirectoryResult<Vec<NamedEntity>> {
        if self.fail_installs {
            return Err(DirectoryError::Transport("connection refused".into()));
        }
        Ok(self.installs.clone())
    }

    fn list_users(&self, account_id: &str) -> DirectoryResult<Vec<DirectoryUser>> {
        self.calls
            .borrow_mut()
            .push(Call::ListUsers(account_id.to_string()));
        if self.failing_listings.contains(account_id) {
            return Err(DirectoryError::Status {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(self.users.get(account_id).cloned().unwrap_or_default())
    }

    fn create_user(&self, account_id: &str, user: &NewUser) -> DirectoryResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::Create(account_id.to_string(), user.clone()));
        self.fail(&user.email)
    }

    fn update_user(
        &self,
        account_id: &str,
        user_id: &str,
        update: &UserUpdate,
    ) -> DirectoryResult<()> {
        self.calls.borrow_mut().push(Call::Update(
            account_id.to_string(),
            user_id.to_string(),
            update.clone(),
        ));
        self.fail(&self.email_of(account_id, user_id))
    }

    fn delete_user(&self, account_id: &str, user_id: &str) -> DirectoryResult<()> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(account_id.to_string(), user_id.to_string()));
        self.fail(&self.email_of(account_id, user_id))
    }
}

pub fn member(account: &str, email: &str) -> Member {
    Member {
        account_name: account.into(),
        first_name: "Test".into(),
        last_name: "User".into(),
        email: email.into(),
        roles: vec!["full".into()],
    }
}
