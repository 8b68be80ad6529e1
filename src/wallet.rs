use anyhow::{Context, Result};
use async_trait::async_trait;
use http::{header::CONTENT_TYPE, Response};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::{
    core::{
        document::{CredentialDocument, SelectiveDisclosureRequest, SelectiveDisclosureResponse},
        identifier::EthrDid,
        util::{base_request, AsyncHttpClient},
    },
    holder::{select_response_claims, Identity, ResponseClaims, ResponseSigner},
};

/// A holder able to answer disclosure requests.
#[async_trait]
pub trait Holder: Sync {
    type HttpClient: AsyncHttpClient + Send + Sync;
    type Signer: ResponseSigner + Send + Sync;

    fn did(&self) -> &EthrDid;
    fn http_client(&self) -> &Self::HttpClient;
    fn signer(&self) -> &Self::Signer;

    /// Choose the claims answering `request` from the holder's documents and identity.
    fn response_claims(
        &self,
        request: &SelectiveDisclosureRequest,
        documents: &[CredentialDocument],
        identity: &Identity,
    ) -> ResponseClaims {
        select_response_claims(self.did(), request, documents, identity)
    }

    async fn sign_response(
        &self,
        request: &SelectiveDisclosureRequest,
        claims: ResponseClaims,
    ) -> Result<SelectiveDisclosureResponse> {
        SelectiveDisclosureResponse::sign(
            self.signer(),
            request,
            claims.own_claims,
            &claims.verified_claims,
        )
        .await
    }

    /// Post a signed response token to the requester's callback.
    ///
    /// The request is attempted once and the response is returned as received, whatever its
    /// status.
    async fn submit_response(&self, callback: &Url, token: &str) -> Result<Response<Vec<u8>>> {
        let body = serde_json::to_vec(&json!({ "access_token": token }))
            .context("failed to serialize response submission")?;

        let http_request = base_request()
            .method("POST")
            .uri(callback.as_str())
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .context("failed to construct response submission request")?;

        let http_response = self
            .http_client()
            .execute(http_request)
            .await
            .context("failed to make response submission request")?;

        debug!(status = %http_response.status(), %callback, "response submitted");
        Ok(http_response)
    }
}
