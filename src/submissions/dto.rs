use serde::Deserialize;

/// Body for POST /api/submissions.
#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub text: String,
}

/// Query parameters for the feed.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    5
}
