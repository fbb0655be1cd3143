//! Chat Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Empty reply from language model")]
    EmptyReply,
}
