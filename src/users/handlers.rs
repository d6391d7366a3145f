use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, put},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{CreateUserRequest, Pagination, UpdateUserRequest},
    repo::{Account, NewAccount},
    service,
};
use crate::{
    auth::{
        claims::{CurrentUser, Role},
        middleware::{require_auth, role_gate},
        service as account_service,
    },
    error::ApiError,
    response::Envelope,
    state::AppState,
    validation,
};

pub fn router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user))
        .route_layer(from_fn_with_state(Role::Admin, role_gate));

    Router::new()
        .route("/me", get(me))
        .route("/:id", put(update_user).delete(delete_user))
        .merge(admin)
        .route_layer(from_fn_with_state(state, require_auth))
}

/// Identity comes from the token, the record from a fresh read; a token
/// for an account that no longer exists is no identity at all.
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Envelope<Account>>, ApiError> {
    let account = Account::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| {
            warn!(account_id = user.id, "token for a missing account");
            ApiError::Unauthenticated
        })?;
    Ok(Json(Envelope::success("User fetched successfully", account)))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Envelope<Vec<Account>>>, ApiError> {
    let accounts = service::list_accounts(&state.db, page.limit, page.offset).await?;
    Ok(Json(Envelope::success(
        "Users fetched successfully",
        accounts,
    )))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<Account>>, ApiError> {
    let account = service::get_account(&state.db, id).await?;
    Ok(Json(Envelope::success("User fetched successfully", account)))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Envelope<Account>>), ApiError> {
    let email = validation::normalize_email(&payload.email);
    validation::validate_name(&payload.name)?;
    validation::validate_email(&email)?;
    validation::validate_password(&payload.password)?;

    let account = account_service::register_account(
        &state.db,
        NewAccount {
            name: payload.name.trim().to_owned(),
            email,
            password: payload.password,
            role: payload.role,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("User created successfully", account)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    requester: CurrentUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Envelope<Account>>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation(
            "At least one field must be provided to update".into(),
        ));
    }

    let mut updates = payload;
    if let Some(name) = updates.name.take() {
        let name = name.trim().to_owned();
        validation::validate_name(&name)?;
        updates.name = Some(name);
    }
    if let Some(email) = updates.email.take() {
        let email = validation::normalize_email(&email);
        validation::validate_email(&email)?;
        updates.email = Some(email);
    }
    if let Some(password) = &updates.password {
        validation::validate_password(password)?;
    }

    let account = service::update_account(&state.db, id, updates, &requester).await?;
    Ok(Json(Envelope::success("User updated successfully", account)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    requester: CurrentUser,
) -> Result<Json<Envelope<Account>>, ApiError> {
    let account = service::delete_account(&state.db, id, &requester).await?;
    Ok(Json(Envelope::success("User deleted successfully", account)))
}
