// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::provide_credential::DefaultCredentialProvider;
use crate::{Config, Credential, RequestBuilder, RequestSigner};
use bytes::Bytes;
use http::{Method, StatusCode};
use ksign_core::{Context, Error, Result, Signer, SigningRequest};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Client signs assembled requests and hands them to the transport.
///
/// There is no retry here, whatever the [`HttpSend`](ksign_core::HttpSend)
/// of the context does is all that happens.
#[derive(Debug, Clone)]
pub struct Client {
    signer: Signer<Credential>,
    endpoint: Option<String>,
}

impl Client {
    /// Create a client from a signer, sending through the signer's context.
    pub fn new(signer: Signer<Credential>) -> Self {
        Self {
            signer,
            endpoint: None,
        }
    }

    /// Create a v4 signing client from `config`, completed from the env.
    ///
    /// `region` and `service` are required. Credentials come from the config
    /// first and the env second.
    pub fn from_config(ctx: Context, config: Config) -> Result<Self> {
        let config = config.from_env(&ctx);
        let region = config
            .region
            .clone()
            .ok_or_else(|| Error::config_invalid("region is required"))?;
        let service = config
            .service
            .clone()
            .ok_or_else(|| Error::config_invalid("service is required"))?;
        let endpoint = config.endpoint.clone();

        let signer = Signer::new(
            ctx,
            DefaultCredentialProvider::new(Arc::new(config)),
            RequestSigner::new(&service, &region),
        );
        Ok(Self { signer, endpoint })
    }

    /// Start a request against the configured endpoint.
    pub fn request(&self, method: Method) -> Result<RequestBuilder> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::config_invalid("endpoint is required to build requests"))?;
        Ok(RequestBuilder::new(method, endpoint))
    }

    /// Sign `req`, send it and decode the response envelope.
    ///
    /// A response carrying an `Error` object, or a non-success status, is
    /// returned as an [`Unexpected`](ksign_core::ErrorKind::Unexpected) error.
    pub async fn send(&self, mut req: SigningRequest) -> Result<Response> {
        self.signer.sign(&mut req).await?;

        let resp = self
            .signer
            .context()
            .http_send(req.into_request()?)
            .await?;
        let (parts, body) = resp.into_parts();

        let envelope: Envelope = serde_json::from_slice(&body).unwrap_or_default();
        if let Some(err) = envelope.error {
            return Err(Error::unexpected(format!(
                "service returned error {} (request id {}): {}",
                err.code.as_deref().unwrap_or("unknown"),
                envelope.request_id.as_deref().unwrap_or("unknown"),
                err.message.as_deref().unwrap_or_default(),
            ))
            .with_source(err));
        }
        if !parts.status.is_success() {
            return Err(Error::unexpected(format!(
                "service responded {}: {}",
                parts.status,
                String::from_utf8_lossy(&body)
            )));
        }

        Ok(Response {
            status: parts.status,
            request_id: envelope.request_id,
            body,
        })
    }
}

/// A successful service response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status.
    pub status: StatusCode,
    /// `RequestId` of the response envelope, if any.
    pub request_id: Option<String>,
    /// Raw response body.
    pub body: Bytes,
}

impl Response {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(rename = "RequestId")]
    request_id: Option<String>,
    #[serde(rename = "Error")]
    error: Option<ServiceError>,
}

/// Error object returned by KsYun services.
#[derive(Debug, Clone, Deserialize, thiserror::Error)]
#[error(
    "{}: {}",
    .code.as_deref().unwrap_or("unknown"),
    .message.as_deref().unwrap_or_default()
)]
pub struct ServiceError {
    /// Error type, such as `Sender`.
    #[serde(rename = "Type")]
    pub r#type: Option<String>,
    /// Error code, such as `InvalidParameter`.
    #[serde(rename = "Code")]
    pub code: Option<String>,
    /// Human readable message.
    #[serde(rename = "Message")]
    pub message: Option<String>,
}
