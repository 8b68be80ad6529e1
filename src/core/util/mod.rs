use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use http::{header::ACCEPT, Request, Response};

/// Generic HTTP client.
///
/// A trait is used here so that callers can supply native HTTP/TLS stacks, e.g. on mobile.
#[async_trait]
pub trait AsyncHttpClient {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

pub(crate) fn base_request() -> http::request::Builder {
    Request::builder().header(ACCEPT, "application/json")
}

/// [AsyncHttpClient] backed by `reqwest` over rustls.
#[derive(Debug)]
pub struct ReqwestClient(reqwest::Client);

impl AsRef<reqwest::Client> for ReqwestClient {
    fn as_ref(&self) -> &reqwest::Client {
        &self.0
    }
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .context("unable to build http_client")
            .map(Self)
    }
}

#[async_trait]
impl AsyncHttpClient for ReqwestClient {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let request: reqwest::Request = request.try_into().context("unable to convert request")?;
        let response = self
            .0
            .execute(request)
            .await
            .context("http request failed")?;

        let mut builder = Response::builder()
            .status(response.status())
            .version(response.version());

        builder
            .headers_mut()
            .context("unable to set headers")?
            .extend(response.headers().clone());

        let body = response
            .bytes()
            .await
            .context("failed to extract response body")?;

        builder
            .body(body.to_vec())
            .context("unable to construct response")
    }
}
