/// API username and password, from flags or `WPENGINE_USERNAME` /
/// `WPENGINE_PASSWORD` (a `.env` file is loaded before arguments are parsed).
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn resolve(username: Option<String>, password: Option<String>) -> anyhow::Result<Credentials> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    match (present(username), present(password)) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        _ => anyhow::bail!(
            "missing API credentials\n\
             Pass --api-username and --api-password, or set WPENGINE_USERNAME and WPENGINE_PASSWORD"
        ),
    }
}
