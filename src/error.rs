use thiserror::Error;

/// Errors that can occur while validating an instance or solving a model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CutError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("problem is infeasible")]
    Infeasible,

    #[error("problem is unbounded")]
    Unbounded,

    #[error("solver error: {0}")]
    Backend(String),
}

impl From<microlp::Error> for CutError {
    fn from(err: microlp::Error) -> Self {
        match err {
            microlp::Error::Infeasible => CutError::Infeasible,
            microlp::Error::Unbounded => CutError::Unbounded,
            microlp::Error::InternalError(msg) => CutError::Backend(msg),
        }
    }
}
