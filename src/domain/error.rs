use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
