use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TutorError {
    #[error("tutor configuration error: {0}")]
    Config(String),

    #[error("text provider failed: {0}")]
    Provider(String),

    #[error("text provider returned an empty response")]
    EmptyResponse,
}

pub type TutorResult<T> = Result<T, TutorError>;
