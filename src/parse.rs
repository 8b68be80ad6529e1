//! Token parsing: decode, temporal check, optional verification and recursive resolution of
//! forwarded and nested tokens.

use futures::future::{join_all, BoxFuture};
use tracing::{debug, warn};

use crate::{
    config::{Config, DEFAULT_MAX_DEPTH},
    core::{
        document::{
            CredentialDocument, ParsedJwt, SelectiveDisclosureProposal,
            SelectiveDisclosureRequest, SelectiveDisclosureResponse,
        },
        envelope::{decode_payload, Envelope, VerifiedClaim},
        error::ParseError,
        identifier::EthrDid,
        temporal::{self, check_validity},
        verification::EnvelopeVerifier,
    },
};

/// Parse a token without verifying its signature, against the current time.
///
/// Only the shape and validity window of the token (and of every forwarded or nested token) are
/// checked. See [Parser::parse] for the verified counterpart.
pub fn unverified_parse(jwt: &str) -> Result<ParsedJwt, ParseError> {
    unverified_parse_at(jwt, temporal::now(), DEFAULT_MAX_DEPTH)
}

/// Parse a token without verifying its signature, against the given time and depth bound.
pub fn unverified_parse_at(
    jwt: &str,
    now: i64,
    max_depth: usize,
) -> Result<ParsedJwt, ParseError> {
    Walk { now, max_depth }.unverified(jwt, 0)
}

#[derive(Debug, Clone, Copy)]
struct Walk {
    now: i64,
    max_depth: usize,
}

impl Walk {
    fn enter(&self, depth: usize) -> Result<(), ParseError> {
        if depth > self.max_depth {
            warn!(limit = self.max_depth, "token nesting too deep");
            return Err(ParseError::RecursionLimit {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn unverified(&self, jwt: &str, depth: usize) -> Result<ParsedJwt, ParseError> {
        self.enter(depth)?;

        let envelope = Envelope::decode(decode_payload(jwt)?)?;
        check_validity(envelope.issued_at(), envelope.expire_at(), self.now)?;

        match envelope {
            Envelope::Forwarding(forwarding) => {
                debug!(depth, "following forwarded token");
                self.unverified(&forwarding.forwarded, depth + 1)
            }
            Envelope::Claim(claim) => {
                let nested = claim
                    .wrapped
                    .values()
                    .map(|nested| self.unverified(nested, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                let nested = into_credentials(nested)?;
                Ok(ParsedJwt::Credential(CredentialDocument::new(
                    claim,
                    jwt.to_owned(),
                    nested,
                )))
            }
            Envelope::Request(specs) => Ok(ParsedJwt::Request(SelectiveDisclosureRequest {
                specs,
                jwt: jwt.to_owned(),
            })),
            Envelope::Proposal(specs) => Ok(ParsedJwt::Proposal(SelectiveDisclosureProposal {
                specs,
                jwt: jwt.to_owned(),
            })),
            Envelope::Response(body) => Ok(ParsedJwt::Response(SelectiveDisclosureResponse {
                body,
                jwt: jwt.to_owned(),
            })),
        }
    }
}

/// Require every resolved nested token to be a claim.
fn into_credentials(parsed: Vec<ParsedJwt>) -> Result<Vec<CredentialDocument>, ParseError> {
    parsed
        .into_iter()
        .map(|p| p.into_credential().ok_or(ParseError::NonCredentialWrap))
        .collect()
}

/// Verifying parser, backed by an [EnvelopeVerifier].
#[derive(Debug, Clone)]
pub struct Parser<V> {
    verifier: V,
    config: Config,
    clock: fn() -> i64,
}

impl<V> Parser<V> {
    pub fn new(verifier: V, config: Config) -> Self {
        Self {
            verifier,
            config,
            clock: temporal::now,
        }
    }

    /// Use another source of the current time, in seconds since the unix epoch.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse without verification, using this parser's clock and depth bound.
    pub fn unverified_parse(&self, jwt: &str) -> Result<ParsedJwt, ParseError> {
        unverified_parse_at(jwt, (self.clock)(), self.config.max_depth)
    }

    fn walk(&self) -> Walk {
        Walk {
            now: (self.clock)(),
            max_depth: self.config.max_depth,
        }
    }
}

impl<V: EnvelopeVerifier> Parser<V> {
    /// Parse a token, verifying its signature and issuer, and those of every forwarded or nested
    /// token.
    ///
    /// The token is first parsed unverified, so malformed or expired tokens fail before any DID
    /// resolution happens. When `audience` is given, request/response/proposal tokens must be
    /// addressed to it. Nested claims are verified without an audience.
    pub async fn parse(
        &self,
        jwt: &str,
        audience: Option<&EthrDid>,
    ) -> Result<ParsedJwt, ParseError> {
        self.parse_at_depth(jwt.to_owned(), audience, 0).await
    }

    fn parse_at_depth<'a>(
        &'a self,
        jwt: String,
        audience: Option<&'a EthrDid>,
        depth: usize,
    ) -> BoxFuture<'a, Result<ParsedJwt, ParseError>> {
        Box::pin(async move {
            self.walk().unverified(&jwt, depth)?;
            let is_claim = matches!(Envelope::decode(decode_payload(&jwt)?)?, Envelope::Claim(_));

            let resolver = self
                .verifier
                .create_resolver(&self.config.resolver_endpoint)
                .map_err(ParseError::ResolverCreation)?;

            let payload = if is_claim {
                self.verifier.verify_credential(&jwt, &resolver).await
            } else {
                self.verifier
                    .verify_envelope(&jwt, &resolver, audience)
                    .await
            }
            .map_err(|e| {
                warn!(depth, "token verification failed: {e:#}");
                ParseError::Verification(e)
            })?;

            match Envelope::decode(payload)? {
                Envelope::Forwarding(forwarding) => {
                    debug!(depth, "following verified forwarded token");
                    self.parse_at_depth(forwarding.forwarded, audience, depth + 1)
                        .await
                }
                Envelope::Claim(claim) => {
                    let nested = self.resolve_nested(&claim, depth + 1).await?;
                    Ok(ParsedJwt::Credential(CredentialDocument::new(
                        claim, jwt, nested,
                    )))
                }
                Envelope::Request(specs) => {
                    Ok(ParsedJwt::Request(SelectiveDisclosureRequest { specs, jwt }))
                }
                Envelope::Proposal(specs) => {
                    Ok(ParsedJwt::Proposal(SelectiveDisclosureProposal { specs, jwt }))
                }
                Envelope::Response(body) => {
                    Ok(ParsedJwt::Response(SelectiveDisclosureResponse { body, jwt }))
                }
            }
        })
    }

    /// Verify every wrapped token concurrently. The first failure in token order wins.
    async fn resolve_nested(
        &self,
        claim: &VerifiedClaim,
        depth: usize,
    ) -> Result<Vec<CredentialDocument>, ParseError> {
        if !claim.wrapped.is_empty() {
            debug!(depth, count = claim.wrapped.len(), "verifying wrapped claims");
        }
        let parsed = join_all(
            claim
                .wrapped
                .values()
                .map(|nested| self.parse_at_depth(nested.clone(), None, depth)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        into_credentials(parsed)
    }
}
