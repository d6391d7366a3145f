use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Name of the session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "token";

/// The cookie outlives the token on purpose: verification re-checks the
/// token's own expiry on every request.
const SESSION_TTL: Duration = Duration::days(7);

/// Build the session cookie. Attributes must stay in sync with
/// `clear_session`: browsers silently ignore a clear whose attributes
/// differ from the set.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(SESSION_TTL)
        .build()
}

/// An expired, emptied twin of `session_cookie`.
pub fn clear_session(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Pull the JWT off a request: bearer header first, session cookie second.
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    bearer_token(headers)
        .map(str::to_owned)
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
