//! Wire shapes of the account user API.

use serde::{Deserialize, Serialize};
use usersync_core::{DirectoryUser, NamedEntity, NewUser, UserUpdate};

/// A page of a `limit`/`offset` paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Install {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountUser {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Comma-separated, e.g. `"full,billing"`.
    #[serde(default)]
    pub roles: Option<String>,
    #[serde(default)]
    pub installs: Option<Vec<InstallRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountUsers {
    pub results: Vec<AccountUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUserProfile<'a> {
    pub account_id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAccountUser<'a> {
    pub user: NewUserProfile<'a>,
    pub roles: String,
    pub install_ids: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateAccountUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub roles: String,
    pub install_ids: &'a [String],
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn join_roles(roles: &[String]) -> String {
    roles.join(",")
}

pub fn split_roles(roles: &str) -> Vec<String> {
    roles
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

impl<'a> CreateAccountUser<'a> {
    pub fn new(account_id: &'a str, user: &'a NewUser) -> Self {
        Self {
            user: NewUserProfile {
                account_id,
                first_name: &user.first_name,
                last_name: &user.last_name,
                email: &user.email,
            },
            roles: join_roles(&user.roles),
            install_ids: &user.install_ids,
        }
    }
}

impl<'a> From<&'a UserUpdate> for UpdateAccountUser<'a> {
    fn from(update: &'a UserUpdate) -> Self {
        Self {
            first_name: &update.first_name,
            last_name: &update.last_name,
            roles: join_roles(&update.roles),
            install_ids: &update.install_ids,
        }
    }
}

impl From<Account> for NamedEntity {
    fn from(a: Account) -> Self {
        NamedEntity {
            id: a.id,
            name: a.name,
        }
    }
}

impl From<Install> for NamedEntity {
    fn from(i: Install) -> Self {
        NamedEntity {
            id: i.id,
            name: i.name,
        }
    }
}

impl From<AccountUser> for DirectoryUser {
    fn from(u: AccountUser) -> Self {
        DirectoryUser {
            id: u.user_id,
            email: u.email.trim().to_string(),
            roles: u.roles.as_deref().map(split_roles).unwrap_or_default(),
            installs: u
                .installs
                .unwrap_or_default()
                .into_iter()
                .map(|i| i.id)
                .collect(),
        }
    }
}
