/*
 * sio - composed, resumable stream I/O operations with cancellation support
 * This is free and unencumbered software released into the public domain.
 */
use std::error::Error;
use std::fmt::{Display, Debug, Formatter};
use std::io::{ErrorKind, Error as IoError};
use std::sync::Arc;

/// The error type for **sio** composed operations
///
/// Composed operations report failures through this single discriminated
/// channel; a lower-level transport failure surfaced by a single-shot
/// read/write is passed through *verbatim* as [`Failed`](SioError::Failed).
///
/// A `SioError` converts losslessly into a [`std::io::Error`](std::io::Error)
/// and back: feeding an `std::io::Error` that carries a `SioError` as its
/// "inner" error into [`from()`](SioError::from) recovers the original
/// variant. This matters for cancellation, which the owning demultiplexer
/// injects by failing a pending single-shot operation with
/// [`SioError::Cancelled`](SioError::Cancelled).
#[derive(Clone)]
pub enum SioError {
    /// Indicates that a pending single-shot operation was *cancelled* by the
    /// owning collaborator. Data may have been read or written partially!
    /// The [`kind()`](std::io::Error::kind()) of this error
    /// is:&ensp;**`ErrorKind::Other`**
    Cancelled,
    /// Indicates that the match condition could not be satisfied before the
    /// buffer's ceiling was reached, or the peer closed the stream first.
    /// The [`kind()`](std::io::Error::kind()) of this error
    /// is:&ensp;**`ErrorKind::NotFound`**
    NotFound,
    /// Indicates that a growth request would have exceeded the buffer's
    /// configured maximum size.
    /// The [`kind()`](std::io::Error::kind()) of this error
    /// is:&ensp;**`ErrorKind::OutOfMemory`**
    TooBig,
    /// Indicates that the operation finished (usually because the stream was
    /// closed) before all data could be written.
    /// The [`kind()`](std::io::Error::kind()) of this error
    /// is:&ensp;**`ErrorKind::UnexpectedEof`**
    Incomplete,
    /// A transport failure surfaced verbatim from a single-shot read/write.
    /// The [`kind()`](std::io::Error::kind()) of this error is the *inner*
    /// error's kind.
    Failed(Arc<IoError>),
}

impl SioError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Other,
            Self::NotFound => ErrorKind::NotFound,
            Self::TooBig => ErrorKind::OutOfMemory,
            Self::Incomplete => ErrorKind::UnexpectedEof,
            Self::Failed(inner) => inner.kind(),
        }
    }
}

impl Debug for SioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "SioError::Cancelled"),
            Self::NotFound => write!(f, "SioError::NotFound"),
            Self::TooBig => write!(f, "SioError::TooBig"),
            Self::Incomplete => write!(f, "SioError::Incomplete"),
            Self::Failed(inner) => write!(f, "SioError::Failed({:?})", inner),
        }
    }
}

impl Display for SioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SioError::Cancelled => write!(f, "The stream operation was cancelled!"),
            SioError::NotFound => write!(f, "The match condition was not satisfied!"),
            SioError::TooBig => write!(f, "The buffer's maximum size was exceeded!"),
            SioError::Incomplete => write!(f, "The stream operation is incomplete!"),
            SioError::Failed(inner) => write!(f, "The stream operation failed: {}", inner),
        }
    }
}

impl Error for SioError { }

impl From<IoError> for SioError {
    fn from(error: IoError) -> Self {
        match error.get_ref().and_then(|inner| inner.downcast_ref::<SioError>()) {
            Some(inner) => inner.clone(),
            None => SioError::Failed(Arc::new(error)),
        }
    }
}

impl From<SioError> for IoError {
    fn from(error: SioError) -> Self {
        IoError::new(error.kind(), error)
    }
}
