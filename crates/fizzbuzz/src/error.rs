/// A result type defaulting to [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All possible errors that `fizzbuzz` can produce.
///
/// Sequence generation and frequency tracking are infallible. The only
/// fallible operation is decoding a [`crate::RequestSignature`] from its
/// canonical comma-joined text form.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The text did not describe a valid signature.
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSignature {
            reason: reason.into(),
        }
    }
}
