use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value as Json;
use tracing::debug;

use crate::core::{
    document::{CredentialDocument, SelectiveDisclosureRequest, SelectiveDisclosureResponse},
    envelope::{ClaimData, Envelope, ResponseBody},
    identifier::EthrDid,
};

/// What a response token attests to, before signing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePayload {
    /// Issuer of the request being answered.
    pub sub: EthrDid,
    /// Token of the request being answered.
    pub req: String,
    pub own: ClaimData,
    /// Tokens of the disclosed verified claims.
    pub verified: Vec<String>,
}

impl ResponsePayload {
    pub fn new(
        request: &SelectiveDisclosureRequest,
        own: ClaimData,
        verified: &[CredentialDocument],
    ) -> Self {
        Self {
            sub: request.issuer.clone(),
            req: request.jwt.clone(),
            own,
            verified: verified.iter().map(|d| d.jwt.clone()).collect(),
        }
    }

    /// Wire payload of the response envelope.
    pub fn to_json(&self) -> Result<Json> {
        Envelope::Response(self.clone().into()).encode()
    }
}

impl From<ResponsePayload> for ResponseBody {
    fn from(value: ResponsePayload) -> Self {
        Self {
            subject: value.sub,
            request_token: value.req,
            own_claims: value.own,
            verified_claims: value.verified,
            issued_at: None,
            expire_at: None,
        }
    }
}

/// Signs response payloads on behalf of the holder.
#[async_trait]
pub trait ResponseSigner {
    /// The identifier the response is issued by.
    fn did(&self) -> &EthrDid;
    /// Produce a compact JWT over the payload. Implementations add `iss` and `iat`.
    async fn sign(&self, payload: &ResponsePayload) -> Result<String>;
}

impl SelectiveDisclosureResponse {
    /// Sign a response to `request` disclosing `own` claims and the given verified documents.
    pub async fn sign<S: ResponseSigner + Sync>(
        signer: &S,
        request: &SelectiveDisclosureRequest,
        own: ClaimData,
        verified: &[CredentialDocument],
    ) -> Result<Self> {
        let payload = ResponsePayload::new(request, own, verified);
        debug!(
            holder = %signer.did(),
            verified = payload.verified.len(),
            "signing disclosure response"
        );
        let jwt = signer
            .sign(&payload)
            .await
            .context("unable to sign disclosure response")?;

        Ok(Self {
            body: payload.into(),
            jwt,
        })
    }
}
