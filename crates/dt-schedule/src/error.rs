use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("record is missing required field: {0}")]
    MissingField(&'static str),

    #[error("record field out of range: {0}")]
    InvalidField(String),

    #[error("insertion preconditions violated: {0}")]
    Infeasible(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
