//! Failure classification.

use std::fmt::Debug;
use std::hash::Hash;

/// Maps a failure to the key used to look up its strategy and handlers.
///
/// The key is usually a fieldless enum mirroring the error's variants, an
/// error code, or any other stable tag. Two failures with equal kinds share
/// one strategy, so the kind must not carry per-occurrence data.
///
/// ```
/// use then_when::Classify;
///
/// #[derive(Debug)]
/// enum FetchError {
///     Timeout,
///     Status(u16),
/// }
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum FetchKind {
///     Timeout,
///     Status,
/// }
///
/// impl Classify for FetchError {
///     type Kind = FetchKind;
///
///     fn kind(&self) -> FetchKind {
///         match self {
///             FetchError::Timeout => FetchKind::Timeout,
///             FetchError::Status(_) => FetchKind::Status,
///         }
///     }
/// }
///
/// assert_eq!(FetchError::Status(503).kind(), FetchKind::Status);
/// ```
pub trait Classify {
    /// The classification key.
    type Kind: Eq + Hash + Clone + Debug;

    /// Classify this failure.
    fn kind(&self) -> Self::Kind;
}

impl Classify for std::io::Error {
    type Kind = std::io::ErrorKind;

    fn kind(&self) -> std::io::ErrorKind {
        std::io::Error::kind(self)
    }
}
