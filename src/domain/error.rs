use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("An application named '{0}' already exists")]
    NameTaken(String),
    #[error("Scheduler unreachable: {0}")]
    SchedulerUnreachable(String),
    #[error("Scheduler rejected the request ({status}): {reason}")]
    SchedulerRejected { status: u16, reason: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
