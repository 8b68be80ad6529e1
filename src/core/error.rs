use anyhow::Error;

/// Failure of a token parse, verified or not.
///
/// The first failure met anywhere in a parse, including inside forwarded or nested tokens, is
/// returned unchanged; no partial result accompanies it.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The token is not a decodable compact JWT.
    #[error("unable to decode token: {0:#}")]
    TokenDecode(#[source] Error),
    /// The decoded payload does not have the shape of any known envelope.
    #[error("unexpected envelope shape:\n{message}")]
    ShapeDecode { message: String },
    #[error("token expired at {expected}, current time is {current}")]
    AfterExpiry { expected: i64, current: i64 },
    #[error("token not valid before {expected}, current time is {current}")]
    BeforeIssuance { expected: i64, current: i64 },
    /// Signature, issuer binding or audience could not be verified.
    #[error("verification failed: {0:#}")]
    Verification(#[source] Error),
    #[error("unable to create DID resolver: {0:#}")]
    ResolverCreation(#[source] Error),
    /// A claim wrapped a token that is not itself a claim.
    #[error("claims may only wrap other claims")]
    NonCredentialWrap,
    /// Forwarding or nesting went deeper than the configured bound.
    #[error("forwarded or nested tokens exceed the maximum depth of {limit}")]
    RecursionLimit { limit: usize },
}

impl ParseError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::ShapeDecode {
            message: message.into(),
        }
    }
}
