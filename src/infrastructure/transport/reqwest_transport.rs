use async_trait::async_trait;

use crate::application::ports::http_transport::{HttpRequest, HttpResponse, HttpTransport};

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, req: HttpRequest) -> anyhow::Result<HttpResponse> {
        // reqwest 0.11 is still on http 0.2, so the method crosses as bytes.
        let method = reqwest::Method::from_bytes(req.method.as_str().as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid method {}: {e}", req.method))?;
        let mut builder = self.client.request(method, &req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request failed: {e}"))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read body: {e}"))?;
        tracing::debug!(status, url = %req.url, "upstream_response");
        Ok(HttpResponse { status, body })
    }
}
