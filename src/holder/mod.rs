//! Holder side of the exchange: choosing what to disclose and signing the answer.

pub mod identity;
pub mod response;
pub mod selection;
pub mod synonyms;

pub use identity::Identity;
pub use response::{ResponsePayload, ResponseSigner};
pub use selection::{select_response_claims, ResponseClaims};
