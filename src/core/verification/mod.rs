use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as Json;

use crate::core::identifier::EthrDid;

/// Verifies token signatures and issuer bindings, resolving DIDs through a resolver built from an
/// endpoint.
///
/// Implementations wrap a concrete JWT/VC verification stack. Each method returns the verified
/// payload, which is decoded again by the caller.
#[async_trait]
pub trait EnvelopeVerifier: Sync {
    /// DID resolution context, built once per parsed token.
    type Resolver: Send + Sync;

    /// Build a resolver for the given endpoint (e.g. an Ethereum RPC url).
    fn create_resolver(&self, endpoint: &str) -> Result<Self::Resolver>;

    /// Verify a request, response, proposal or forwarding token.
    ///
    /// When `audience` is provided the token must be addressed to it.
    async fn verify_envelope(
        &self,
        jwt: &str,
        resolver: &Self::Resolver,
        audience: Option<&EthrDid>,
    ) -> Result<Json>;

    /// Verify a claim token.
    async fn verify_credential(&self, jwt: &str, resolver: &Self::Resolver) -> Result<Json>;
}
