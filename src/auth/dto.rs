use serde::{Deserialize, Serialize};

use super::claims::Role;
use crate::users::repo::Account;

/// Body for POST /api/auth/register.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Body for POST /api/auth/login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for register/login responses. The token rides in the body for
/// bearer-mode clients as well as in the session cookie.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub token: String,
    pub user: Account,
}
