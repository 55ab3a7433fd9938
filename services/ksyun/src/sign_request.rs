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

use crate::constants::{ALGORITHM_V4, X_AMZ_DATE};
use crate::Credential;
use async_trait::async_trait;
use http::{header, HeaderMap, HeaderValue};
use ksign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use ksign_core::time::{format_date, format_iso8601, now, DateTime};
use ksign_core::{Context, Error, Result, SignRequest, SigningRequest};
use log::debug;
use std::fmt::{self, Display, Formatter, Write};

/// RequestSigner signs requests with the v4 `AWS4-HMAC-SHA256` scheme
/// accepted by KsYun OpenAPI endpoints.
///
/// The signature covers the method, the encoded path, the canonical query,
/// every header of the request plus `x-amz-date` (`content-length` excluded)
/// and the SHA-256 hash of the exact payload.
#[derive(Debug)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Compute the signature headers of `req` at instant `now`.
    ///
    /// `req` is never modified, the headers to sign are a private copy.
    pub fn sign(
        &self,
        req: &SigningRequest,
        cred: &Credential,
        now: DateTime,
    ) -> Result<SignedHeaders> {
        if cred.access_key_id.trim().is_empty() || cred.secret_access_key.trim().is_empty() {
            return Err(Error::signing(
                "access key id and secret access key must not be blank",
            ));
        }

        let payload_hash = hex_sha256(&req.payload()?);
        let creq = CanonicalRequest::build(req, now, &payload_hash)?;
        debug!("calculated canonical request: {}", creq.text);

        let scope = CredentialScope {
            date: format_date(now),
            region: &self.region,
            service: &self.service,
        };
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{ALGORITHM_V4}")?;
            writeln!(f, "{}", format_iso8601(now))?;
            writeln!(f, "{scope}")?;
            write!(f, "{}", hex_sha256(creq.text.as_bytes()))?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        Ok(SignedHeaders {
            authorization: format!(
                "{ALGORITHM_V4} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
                cred.access_key_id, creq.signed_headers
            ),
            date: format_iso8601(now),
        })
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut SigningRequest,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::signing("no credential provided for v4 signing"));
        };

        let signed = self.sign(req, cred, self.time.unwrap_or_else(now))?;

        let mut authorization = HeaderValue::from_str(&signed.authorization)?;
        authorization.set_sensitive(true);
        req.headers.insert(header::AUTHORIZATION, authorization);
        req.headers
            .insert(X_AMZ_DATE, HeaderValue::from_str(&signed.date)?);

        Ok(())
    }
}

/// Output of [`RequestSigner::sign`], to be merged into the outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of the `Authorization` header.
    pub authorization: String,
    /// Value of the `x-amz-date` header.
    pub date: String,
}

struct CanonicalRequest {
    text: String,
    signed_headers: String,
}

impl CanonicalRequest {
    fn build(req: &SigningRequest, now: DateTime, payload_hash: &str) -> Result<Self> {
        let headers = canonical_headers(req, now)?;

        // 256 is specially chosen to avoid reallocation for most requests.
        let mut f = String::with_capacity(256);
        writeln!(f, "{}", req.method.as_str().to_uppercase())?;
        writeln!(f, "{}", req.encoded_path())?;
        writeln!(f, "{}", req.canonical_query())?;

        let mut names: Vec<&str> = headers.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        for name in &names {
            // Repeated headers are signed as one comma separated line.
            let values = headers
                .get_all(*name)
                .iter()
                .map(|v| v.to_str())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            writeln!(f, "{name}:{}", values.join(","))?;
        }
        writeln!(f)?;

        let signed_headers = names.join(";");
        writeln!(f, "{signed_headers}")?;
        write!(f, "{payload_hash}")?;

        Ok(Self {
            text: f,
            signed_headers,
        })
    }
}

/// Copy the request headers into the set that will be signed.
fn canonical_headers(req: &SigningRequest, now: DateTime) -> Result<HeaderMap> {
    let mut headers = req.headers.clone();
    for (_, value) in headers.iter_mut() {
        SigningRequest::header_value_normalize(value)?;
    }

    // Added after signing by the transport.
    headers.remove(header::CONTENT_LENGTH);
    // Left over from a previous signature.
    headers.remove(header::AUTHORIZATION);

    if headers.get(header::HOST).is_none() {
        headers.insert(header::HOST, req.authority.as_str().parse()?);
    }
    headers.insert(X_AMZ_DATE, HeaderValue::from_str(&format_iso8601(now))?);

    Ok(headers)
}

/// Scope: "20220313/<region>/<service>/aws4_request"
struct CredentialScope<'a> {
    date: String,
    region: &'a str,
    service: &'a str,
}

impl Display for CredentialScope<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/aws4_request",
            self.date, self.region, self.service
        )
    }
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}
