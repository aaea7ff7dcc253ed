use serde::{Deserialize, Serialize};

use crate::store::Role;

/// Body for POST /signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

/// Form body for POST /login (OAuth2 password-style field names).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response for POST /login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
