use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthData, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    service, session,
};
use crate::{
    error::ApiError, response::Envelope, state::AppState, users::repo::NewAccount, validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<Envelope<AuthData>>), ApiError> {
    let email = validation::normalize_email(&payload.email);
    validation::validate_name(&payload.name)?;
    validation::validate_email(&email)?;
    validation::validate_password(&payload.password)?;

    let account = service::register_account(
        &state.db,
        NewAccount {
            name: payload.name.trim().to_owned(),
            email,
            password: payload.password,
            role: payload.role,
        },
    )
    .await?;

    let token = JwtKeys::from_ref(&state).sign(&account)?;
    let jar = jar.add(session::session_cookie(
        token.clone(),
        state.config.cookie_secure,
    ));

    info!(account_id = account.id, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(Envelope::success(
            "User registered successfully",
            AuthData {
                token,
                user: account,
            },
        )),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Envelope<AuthData>>), ApiError> {
    let email = validation::normalize_email(&payload.email);
    validation::validate_email(&email)?;
    validation::validate_password(&payload.password)?;

    let account = match service::authenticate(&state.db, &email, &payload.password).await {
        Ok(account) => account,
        Err(err) => {
            if matches!(err, ApiError::InvalidCredentials) {
                warn!(email = %email, "login rejected");
            }
            return Err(err);
        }
    };

    let token = JwtKeys::from_ref(&state).sign(&account)?;
    let jar = jar.add(session::session_cookie(
        token.clone(),
        state.config.cookie_secure,
    ));

    info!(account_id = account.id, "user logged in");
    Ok((
        jar,
        Json(Envelope::success(
            "Logged in successfully",
            AuthData {
                token,
                user: account,
            },
        )),
    ))
}

/// Auth is stateless, so logout just tells the client to drop the token:
/// the session cookie is replaced with an expired twin.
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<Envelope<()>>) {
    let jar = jar.add(session::clear_session(state.config.cookie_secure));
    (jar, Json(Envelope::success("Logged out successfully", ())))
}
