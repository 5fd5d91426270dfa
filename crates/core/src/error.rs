use thiserror::Error;

use crate::types::MAX_CONTENT_CHARS;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    /// The id failed format validation; storage was never consulted.
    #[error("invalid channel id: {0}")]
    InvalidChannelId(String),

    #[error("message is {chars} characters, the limit is {max}")]
    ContentTooLong { chars: usize, max: usize },

    #[error("could not allocate an unused channel id after {attempts} attempts")]
    AllocationError { attempts: u32 },

    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),

    #[error("stored record could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        StoreError::Backend(err.into())
    }

    /// True for errors that mean "the caller named a channel that isn't there".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NoSuchChannel(_) | StoreError::InvalidChannelId(_)
        )
    }

    /// Reject message content longer than [`MAX_CONTENT_CHARS`].
    pub fn check_content(content: &str) -> StoreResult<()> {
        let chars = content.chars().count();
        if chars > MAX_CONTENT_CHARS {
            Err(StoreError::ContentTooLong {
                chars,
                max: MAX_CONTENT_CHARS,
            })
        } else {
            Ok(())
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
