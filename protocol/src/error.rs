use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("The server has no message for \"{0}\"")]
    Unsupported(&'static str),
}

pub type Result<T> = core::result::Result<T, ProtocolError>;
