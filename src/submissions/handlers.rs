use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateSubmissionRequest, Pagination},
    repo::Submission,
};
use crate::{
    auth::{claims::MaybeUser, middleware::attach_user},
    error::ApiError,
    response::Envelope,
    state::AppState,
    validation,
};

/// Public feed: no auth required, but a presented identity is attached
/// so submissions can be correlated with accounts in the logs.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_submissions).post(create_submission))
        .route_layer(from_fn_with_state(state, attach_user))
}

#[instrument(skip(state, user, payload))]
pub async fn create_submission(
    State(state): State<AppState>,
    user: MaybeUser,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Envelope<Submission>>), ApiError> {
    let text = validation::validate_submission_text(&payload.text)?;
    let submission = Submission::insert(&state.db, &text).await?;

    match &user.0 {
        Some(u) => info!(
            submission_id = submission.id,
            account_id = u.id,
            "submission created"
        ),
        None => info!(submission_id = submission.id, "submission created"),
    }

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(
            "Submission created successfully",
            submission,
        )),
    ))
}

#[instrument(skip(state))]
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Envelope<Vec<Submission>>>, ApiError> {
    let submissions = Submission::list_recent(&state.db, page.limit.clamp(1, 100)).await?;
    Ok(Json(Envelope::success(
        "Submissions fetched successfully",
        submissions,
    )))
}
