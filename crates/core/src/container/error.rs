use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum AviError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("writer has already been finalized")]
    Finalized,
    #[error("writer was aborted by an earlier I/O failure")]
    Aborted,
    #[error("writer is not open")]
    NotOpen,
    #[error("frame encoding failed: {0}")]
    Encode(#[source] BoxError),
    #[error("frame encoder produced no data")]
    EmptyFrame,
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("{field} does not fit a 32-bit AVI field: {value}")]
    SizeOverflow { field: &'static str, value: u64 },
}

impl AviError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| AviError::Io { context, source }
    }

    /// True for calls made in the wrong writer state (after finish, after an
    /// abort, before open).
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            AviError::Finalized | AviError::Aborted | AviError::NotOpen
        )
    }
}
