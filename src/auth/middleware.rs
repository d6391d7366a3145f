use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::{
    claims::{CurrentUser, Role},
    jwt::JwtKeys,
    session,
};
use crate::{error::ApiError, state::AppState};

/// Optional-attach: decorate the request with an identity when a valid
/// token is present, otherwise let it through untouched. An invalid token
/// is logged and ignored, never rejected.
pub async fn attach_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = session::extract_token(req.headers(), &jar) {
        match JwtKeys::from_ref(&state).verify(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(CurrentUser::from(claims));
            }
            Err(err) => warn!(error = %err, "ignoring bad token on public route"),
        }
    }
    next.run(req).await
}

/// Required-attach: reject with 401 before the handler unless a valid
/// token is presented. Missing, invalid and expired tokens all produce
/// the same client-visible outcome.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        session::extract_token(req.headers(), &jar).ok_or(ApiError::Unauthenticated)?;
    let claims = JwtKeys::from_ref(&state).verify(&token).map_err(|err| {
        warn!(error = %err, "rejecting request with bad token");
        ApiError::Unauthenticated
    })?;
    req.extensions_mut().insert(CurrentUser::from(claims));
    Ok(next.run(req).await)
}

/// Role-gate: assumes `require_auth` already attached an identity.
/// A missing identity means the route was wired without it, which is a
/// server bug rather than a client error.
pub async fn role_gate(
    State(expected): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match req.extensions().get::<CurrentUser>() {
        None => Err(ApiError::Internal(anyhow::anyhow!(
            "role gate reached without an authenticated identity"
        ))),
        Some(user) if user.role != expected => Err(ApiError::Forbidden(format!(
            "Forbidden: requires {expected} role"
        ))),
        Some(_) => Ok(next.run(req).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::MaybeUser;
    use crate::users::repo::Account;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use time::OffsetDateTime;
    use tower::ServiceExt;

    async fn whoami(user: MaybeUser) -> String {
        user.0
            .map(|u| u.email)
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn signed_token(state: &AppState, role: Role) -> String {
        let now = OffsetDateTime::now_utc();
        let account = Account {
            id: 7,
            name: "Ann Lee".into(),
            email: "ann@x.com".into(),
            password_hash: "irrelevant".into(),
            role,
            created_at: now,
            updated_at: now,
        };
        JwtKeys::from_ref(state).sign(&account).expect("sign")
    }

    fn optional_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(whoami))
            .layer(from_fn_with_state(state, attach_user))
    }

    fn required_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(whoami))
            .layer(from_fn_with_state(state, require_auth))
    }

    fn admin_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(whoami))
            .layer(from_fn_with_state(Role::Admin, role_gate))
            .layer(from_fn_with_state(state, require_auth))
    }

    fn request(token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(res: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), 4096).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn optional_attach_lets_anonymous_requests_through() {
        let res = optional_router(AppState::fake())
            .oneshot(request(None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "anonymous");
    }

    #[tokio::test]
    async fn optional_attach_ignores_bad_tokens() {
        let res = optional_router(AppState::fake())
            .oneshot(request(Some("garbage")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "anonymous");
    }

    #[tokio::test]
    async fn optional_attach_decorates_valid_tokens() {
        let state = AppState::fake();
        let token = signed_token(&state, Role::User);
        let res = optional_router(state)
            .oneshot(request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ann@x.com");
    }

    #[tokio::test]
    async fn required_attach_rejects_missing_tokens_before_the_handler() {
        let res = required_router(AppState::fake())
            .oneshot(request(None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn required_attach_rejects_bad_tokens() {
        let res = required_router(AppState::fake())
            .oneshot(request(Some("garbage")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn required_attach_passes_valid_tokens() {
        let state = AppState::fake();
        let token = signed_token(&state, Role::User);
        let res = required_router(state)
            .oneshot(request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ann@x.com");
    }

    #[tokio::test]
    async fn cookie_tokens_work_like_bearer_tokens() {
        let state = AppState::fake();
        let token = signed_token(&state, Role::User);
        let req = HttpRequest::builder()
            .uri("/")
            .header(header::COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap();
        let res = required_router(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn role_gate_forbids_the_wrong_role() {
        let state = AppState::fake();
        let token = signed_token(&state, Role::User);
        let res = admin_router(state)
            .oneshot(request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn role_gate_passes_the_expected_role() {
        let state = AppState::fake();
        let token = signed_token(&state, Role::Admin);
        let res = admin_router(state)
            .oneshot(request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn role_gate_without_auth_is_a_server_error() {
        // Misconfiguration: gate mounted with no require_auth in front.
        let app = Router::new()
            .route("/", get(whoami))
            .layer(from_fn_with_state(Role::Admin, role_gate));
        let res = app.oneshot(request(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
