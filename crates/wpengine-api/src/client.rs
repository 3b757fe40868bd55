use crate::error::ApiError;
use crate::types::{
    Account, AccountUser, AccountUsers, CreateAccountUser, CurrentUser, Install, Page,
    UpdateAccountUser,
};
use crate::Result;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use usersync_core::{
    Directory, DirectoryResult, DirectoryUser, NamedEntity, NewUser, UserUpdate,
};

// ─── ClientConfig ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub page_size: u32,
    /// `None` disables the request timeout.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            page_size: 100,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────

/// Blocking client for the account user API, authenticated with HTTP basic
/// auth on every request.
pub struct Client {
    http: HttpClient,
    base_url: String,
    username: String,
    password: String,
    page_size: u32,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!("wpe-usersync/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
            page_size: config.page_size.max(1),
        })
    }

    pub fn current_user(&self) -> Result<CurrentUser> {
        self.get("/user", &[])
    }

    pub fn accounts(&self) -> Result<Vec<Account>> {
        self.paginate("/accounts")
    }

    pub fn installs(&self) -> Result<Vec<Install>> {
        self.paginate("/installs")
    }

    pub fn account_users(&self, account_id: &str) -> Result<Vec<AccountUser>> {
        let page: AccountUsers = self.get(&format!("/accounts/{account_id}/account_users"), &[])?;
        Ok(page.results)
    }

    pub fn create_account_user(&self, account_id: &str, body: &CreateAccountUser) -> Result<()> {
        self.send_json(
            Method::POST,
            &format!("/accounts/{account_id}/account_users"),
            body,
        )
    }

    pub fn update_account_user(
        &self,
        account_id: &str,
        user_id: &str,
        body: &UpdateAccountUser,
    ) -> Result<()> {
        self.send_json(
            Method::PATCH,
            &format!("/accounts/{account_id}/account_users/{user_id}"),
            body,
        )
    }

    pub fn delete_account_user(&self, account_id: &str, user_id: &str) -> Result<()> {
        let path = format!("/accounts/{account_id}/account_users/{user_id}");
        self.execute(Method::DELETE, &path, self.request(Method::DELETE, &path))?;
        Ok(())
    }

    // ─── Internal ─────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
    }

    fn execute(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Response> {
        tracing::debug!(%method, path, "api request");
        let resp = req.send()?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let req = self.request(Method::GET, path).query(query);
        let text = self.execute(Method::GET, path, req)?.text()?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    fn send_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> Result<()> {
        let req = self.request(method.clone(), path).json(body);
        self.execute(method, path, req)?;
        Ok(())
    }

    /// Follow `limit`/`offset` pages until `next` is absent.
    fn paginate<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut offset = 0usize;
        loop {
            let page: Page<T> = self.get(
                path,
                &[
                    ("limit", self.page_size.to_string()),
                    ("offset", offset.to_string()),
                ],
            )?;
            let fetched = page.results.len();
            out.extend(page.results);
            if page.next.is_none() || fetched == 0 {
                break;
            }
            offset += fetched;
        }
        tracing::debug!(path, items = out.len(), "paginated listing complete");
        Ok(out)
    }
}

// ─── Directory ────────────────────────────────────────────────────────────

impl Directory for Client {
    fn verify_access(&self) -> DirectoryResult<()> {
        let user = self.current_user()?;
        tracing::debug!(user_id = %user.id, "authenticated");
        Ok(())
    }

    fn list_accounts(&self) -> DirectoryResult<Vec<NamedEntity>> {
        Ok(self.accounts()?.into_iter().map(Into::into).collect())
    }

    fn list_installs(&self) -> DirectoryResult<Vec<NamedEntity>> {
        Ok(self.installs()?.into_iter().map(Into::into).collect())
    }

    fn list_users(&self, account_id: &str) -> DirectoryResult<Vec<DirectoryUser>> {
        Ok(self
            .account_users(account_id)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    fn create_user(&self, account_id: &str, user: &NewUser) -> DirectoryResult<()> {
        Ok(self.create_account_user(account_id, &CreateAccountUser::new(account_id, user))?)
    }

    fn update_user(
        &self,
        account_id: &str,
        user_id: &str,
        update: &UserUpdate,
    ) -> DirectoryResult<()> {
        Ok(self.update_account_user(account_id, user_id, &update.into())?)
    }

    fn delete_user(&self, account_id: &str, user_id: &str) -> DirectoryResult<()> {
        Ok(self.delete_account_user(account_id, user_id)?)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use usersync_core::DirectoryError;

    // base64("user:pass")
    const AUTH: &str = "Basic dXNlcjpwYXNz";

    fn client(server: &ServerGuard, page_size: u32) -> Client {
        let mut cfg = ClientConfig::new(server.url(), "user", "pass");
        cfg.page_size = page_size;
        Client::new(cfg).unwrap()
    }

    fn page_query(limit: &str, offset: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), limit.into()),
            Matcher::UrlEncoded("offset".into(), offset.into()),
        ])
    }

    #[test]
    fn verify_access_sends_basic_auth() {
        let mut server = Server::new();
        let m = server
            .mock("GET", "/user")
            .match_header("authorization", AUTH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "me", "email": "admin@x.com"}"#)
            .create();

        assert!(client(&server, 100).verify_access().is_ok());
        m.assert();
    }

    #[test]
    fn rejected_credentials_map_to_unauthorized() {
        let mut server = Server::new();
        let _m = server.mock("GET", "/user").with_status(401).create();

        let err = client(&server, 100).verify_access().unwrap_err();
        assert_eq!(err, DirectoryError::Unauthorized);
    }

    #[test]
    fn accounts_follow_pagination() {
        let mut server = Server::new();
        let first = server
            .mock("GET", "/accounts")
            .match_query(page_query("2", "0"))
            .with_status(200)
            .with_body(
                r#"{"next": "more", "count": 3, "results": [
                    {"id": "acc-1", "name": "Acme"},
                    {"id": "acc-2", "name": "Globex"}
                ]}"#,
            )
            .create();
        let second = server
            .mock("GET", "/accounts")
            .match_query(page_query("2", "2"))
            .with_status(200)
            .with_body(
                r#"{"next": null, "count": 3, "results": [{"id": "acc-3", "name": "Initech"}]}"#,
            )
            .create();

        let accounts = client(&server, 2).list_accounts().unwrap();
        let names: Vec<&str> = accounts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Globex", "Initech"]);
        first.assert();
        second.assert();
    }

    #[test]
    fn list_users_converts_wire_shape() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/accounts/acc-1/account_users")
            .with_status(200)
            .with_body(
                r#"{"results": [{
                    "user_id": "u-1", "account_id": "acc-1",
                    "first_name": "Bob", "last_name": "Smith",
                    "email": "bob@x.com", "roles": "full",
                    "installs": [{"id": "ins-1", "name": "site1"}]
                }]}"#,
            )
            .create();

        let users = client(&server, 100).list_users("acc-1").unwrap();
        assert_eq!(users[0].id, "u-1");
        assert_eq!(users[0].email, "bob@x.com");
        assert_eq!(users[0].installs, vec!["ins-1"]);
    }

    #[test]
    fn create_posts_nested_profile() {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/accounts/acc-1/account_users")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "user": {"account_id": "acc-1", "email": "bob@x.com", "first_name": "Bob"},
                "roles": "full,billing",
                "install_ids": ["ins-1"]
            })))
            .with_status(201)
            .with_body("{}")
            .create();

        let user = NewUser {
            first_name: "Bob".into(),
            last_name: "Smith".into(),
            email: "bob@x.com".into(),
            roles: vec!["full".into(), "billing".into()],
            install_ids: vec!["ins-1".into()],
        };
        client(&server, 100).create_user("acc-1", &user).unwrap();
        m.assert();
    }

    #[test]
    fn update_patches_user() {
        let mut server = Server::new();
        let m = server
            .mock("PATCH", "/accounts/acc-1/account_users/u-1")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "first_name": "Robert",
                "roles": "partial",
                "install_ids": []
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        let update = UserUpdate {
            first_name: "Robert".into(),
            last_name: "Smith".into(),
            roles: vec!["partial".into()],
            install_ids: vec![],
        };
        client(&server, 100)
            .update_user("acc-1", "u-1", &update)
            .unwrap();
        m.assert();
    }

    #[test]
    fn delete_surfaces_server_errors() {
        let mut server = Server::new();
        let _m = server
            .mock("DELETE", "/accounts/acc-1/account_users/u-1")
            .with_status(500)
            .with_body("boom")
            .create();

        let err = client(&server, 100).delete_user("acc-1", "u-1").unwrap_err();
        assert_eq!(
            err,
            DirectoryError::Status {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/accounts/acc-1/account_users")
            .with_status(200)
            .with_body("not json")
            .create();

        let err = client(&server, 100).list_users("acc-1").unwrap_err();
        assert!(matches!(err, DirectoryError::Decode(_)));
    }
}
