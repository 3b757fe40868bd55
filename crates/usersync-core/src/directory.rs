//! The capability set the engine consumes from the remote user directory.
//!
//! The engine never talks HTTP itself; it drives a [`Directory`] and treats
//! every call as blocking and synchronous.

use crate::types::{DirectoryUser, NamedEntity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("unauthorized: check API credentials")]
    Unauthorized,

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response payload: {0}")]
    Decode(String),
}

pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// Profile and memberships for a user that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub install_ids: Vec<String>,
}

/// Replacement profile and memberships for an existing user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub install_ids: Vec<String>,
}

pub trait Directory {
    /// `Ok(())` when the credentials are accepted.
    fn verify_access(&self) -> DirectoryResult<()>;

    fn list_accounts(&self) -> DirectoryResult<Vec<NamedEntity>>;

    fn list_installs(&self) -> DirectoryResult<Vec<NamedEntity>>;

    fn list_users(&self, account_id: &str) -> DirectoryResult<Vec<DirectoryUser>>;

    fn create_user(&self, account_id: &str, user: &NewUser) -> DirectoryResult<()>;

    fn update_user(
        &self,
        account_id: &str,
        user_id: &str,
        update: &UserUpdate,
    ) -> DirectoryResult<()>;

    fn delete_user(&self, account_id: &str, user_id: &str) -> DirectoryResult<()>;
}
