//! HTTP implementation of [`RemoteStore`] against the server's JSON API.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, StatusCode};

use veristore_common::wire::{ErrorBody, ProofRequest, ProofResponse, UploadRequest};
use veristore_merkle::{sha256, Hash, Proof};

use crate::error::ClientError;
use crate::remote::RemoteStore;

pub struct ApiClient {
    base: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            base: base.into(),
            client,
        }
    }

    async fn error_from(status: StatusCode, response: reqwest::Response) -> ClientError {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => String::new(),
        };
        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RemoteStore for ApiClient {
    async fn upload(
        &self,
        root: &str,
        index: usize,
        total: usize,
        content: &[u8],
    ) -> Result<(), ClientError> {
        let url = format!("{}/upload", self.base);
        let body = UploadRequest {
            root: root.to_string(),
            index,
            total,
            content: BASE64.encode(content),
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status, response).await);
        }
        Ok(())
    }

    async fn request(&self, root: &str, index: usize) -> Result<(Vec<u8>, Proof), ClientError> {
        let url = format!("{}/request", self.base);
        let body = ProofRequest {
            root: root.to_string(),
            index,
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status, response).await);
        }

        let payload: ProofResponse = response.json().await?;
        let content = BASE64.decode(payload.content)?;
        let mut hashes = Vec::with_capacity(payload.proof.len());
        for encoded in payload.proof {
            hashes.push(Hash::new(BASE64.decode(encoded)?));
        }
        Ok((content, Proof::new(sha256(), hashes)))
    }
}
