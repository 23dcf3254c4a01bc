use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("stale message ignored: {0}")]
    StaleMessage(String),

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("behavior configuration error: {0}")]
    Config(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
