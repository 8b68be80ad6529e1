//! Selective disclosure of personal and verifiable claims between `did:ethr` identities.
//!
//! Parties exchange compact signed tokens carrying one of four envelopes:
//!
//! - a *request* for own (unsigned) and verified claims,
//! - a *response* disclosing a subset of them,
//! - a *proposal* of what a request could ask for,
//! - a *claim*, i.e. a verifiable credential, possibly wrapping other claims.
//!
//! A *forwarding* token carries another token and is parsed in its place.
//!
//! # Parsing
//!
//! ```ignore
//! use selective_disclosure::{config::Config, parse::Parser, core::document::ParsedJwt};
//!
//! let parser = Parser::new(my_verifier, Config::new("https://mainnet.infura.io/v3/..."));
//!
//! match parser.parse(&token, Some(&my_did)).await? {
//!     ParsedJwt::Request(request) => { /* answer it */ }
//!     ParsedJwt::Credential(document) => { /* store it */ }
//!     _ => {}
//! }
//! ```
//!
//! Signatures and issuer bindings are checked by an [`EnvelopeVerifier`], which wraps the
//! caller's JWT and DID resolution stack. [`unverified_parse`] only checks shape and validity
//! windows.
//!
//! [`EnvelopeVerifier`]: crate::core::verification::EnvelopeVerifier
//! [`unverified_parse`]: crate::parse::unverified_parse
//!
//! # Answering a request
//!
//! ```ignore
//! use selective_disclosure::wallet::Holder;
//!
//! let claims = holder.response_claims(&request, &documents, &identity);
//! if !claims.is_complete() {
//!     // ask the user about claims.missing_required
//! }
//! let response = holder.sign_response(&request, claims).await?;
//! if let Some(callback) = &request.callback {
//!     holder.submit_response(&callback.parse()?, &response.jwt).await?;
//! }
//! ```

pub mod config;
pub mod core;
pub mod holder;
pub mod parse;
pub mod wallet;

pub use crate::core::{
    document::{CredentialDocument, ParsedJwt},
    error::ParseError,
    identifier::EthrDid,
};
