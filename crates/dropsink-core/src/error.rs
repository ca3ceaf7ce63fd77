//! Error taxonomy for the save pipeline.

use std::io;
use thiserror::Error;

/// Errors that abort a single item or a whole request.
#[derive(Debug, Error)]
pub enum SaveError {
    /// No classification branch matched the request.
    #[error("no handler matches this payload")]
    Unsupported,

    /// Destination file exists and the collision policy is Skip.
    #[error("destination file already exists")]
    FileExists,

    /// Postfix policy ran out of counter candidates.
    #[error("more than {limit} postfix collisions, giving up")]
    TooManyCollisions { limit: u32 },

    /// The interactive-rename collision policy reached the resolver.
    #[error("interactive rename is not implemented")]
    NotImplemented,

    /// The payload byte source could not be opened.
    #[error("payload source unreadable: {0}")]
    SourceUnreadable(#[source] io::Error),

    /// A filesystem read or write failed mid-persist.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// URL probing yielded no content type and force-saving is off.
    #[error("could not determine content type for {url}")]
    ContentTypeUndetermined { url: String },
}

/// Message code attached to a batch outcome for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCode {
    FileExists,
    TooManyCollisions,
    Unsupported,
    ContentTypeUndetermined,
}

impl SaveError {
    /// Message code to surface for this error, if any.
    pub fn message_code(&self) -> Option<MessageCode> {
        match self {
            SaveError::FileExists => Some(MessageCode::FileExists),
            SaveError::TooManyCollisions { .. } => Some(MessageCode::TooManyCollisions),
            SaveError::Unsupported => Some(MessageCode::Unsupported),
            SaveError::ContentTypeUndetermined { .. } => {
                Some(MessageCode::ContentTypeUndetermined)
            }
            SaveError::NotImplemented | SaveError::SourceUnreadable(_) | SaveError::Io(_) => None,
        }
    }
}
