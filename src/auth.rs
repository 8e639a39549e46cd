use crate::api::ApiClient;
use crate::error::{MintError, Result};
use crate::models::{LoginRequest, LoginResponse};
use tracing::debug;

/// Exchanges credentials for a bearer token.
#[derive(Clone, Debug)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        AuthService { client }
    }

    /// Log in and return the token. Blank credentials are rejected before
    /// any request is sent; a 2xx answer without a token is an error.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        if username.trim().is_empty() {
            return Err(MintError::validation("username is required"));
        }
        if password.trim().is_empty() {
            return Err(MintError::validation("password is required"));
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        debug!(username, "logging in");
        let response: LoginResponse = self.client.post("/login", &request, None)?;

        match response.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(MintError::protocol("no token in response", None)),
        }
    }
}
