#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error("Session not found: {0}. Run study_process first")]
    SessionNotFound(String),

    #[error("Session expired: {0}. Run study_process again")]
    SessionExpired(String),
}
