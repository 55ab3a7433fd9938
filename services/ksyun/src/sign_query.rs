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

use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use ksign_core::encoding::canonical_query;
use ksign_core::hash::hex_hmac_sha256;
use ksign_core::time::{format_iso8601_with_separator, now, DateTime};
use ksign_core::{Context, Error, ParameterSet, Result, SignRequest, SigningRequest};
use log::debug;

/// QuerySigner signs requests with the legacy signature version `1.0`.
///
/// The signature travels as a request parameter next to the common
/// parameters `Accesskey`, `Timestamp`, `SignatureVersion`, `SignatureMethod`
/// and `Region`:
///
/// ```text
/// Signature = hex(HMAC-SHA256(secret, canonical query))
/// ```
#[derive(Debug)]
pub struct QuerySigner {
    region: String,

    time: Option<DateTime>,
}

impl QuerySigner {
    /// Create a new signer for the given region.
    pub fn new(region: &str) -> Self {
        Self {
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

    /// Add the common parameters and the signature to `params`.
    pub fn sign(&self, params: &mut ParameterSet, cred: &Credential, now: DateTime) -> Result<()> {
        if cred.access_key_id.trim().is_empty() || cred.secret_access_key.trim().is_empty() {
            return Err(Error::signing(
                "access key id and secret access key must not be blank",
            ));
        }

        params.remove(PARAM_SIGNATURE);
        params.insert(PARAM_ACCESS_KEY, cred.access_key_id.as_str());
        params.insert(PARAM_TIMESTAMP, format_iso8601_with_separator(now));
        params.insert(PARAM_SIGNATURE_VERSION, SIGNATURE_VERSION_V1);
        params.insert(PARAM_SIGNATURE_METHOD, SIGNATURE_METHOD_V1);
        params.insert(PARAM_REGION, self.region.as_str());

        let query = canonical_query(params);
        debug!("calculated canonical query: {query}");

        let signature = hex_hmac_sha256(cred.secret_access_key.as_bytes(), query.as_bytes());
        params.insert(PARAM_SIGNATURE, signature);
        Ok(())
    }
}

#[async_trait]
impl SignRequest for QuerySigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut SigningRequest,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::signing("no credential provided for query signing"));
        };

        self.sign(&mut req.params, cred, self.time.unwrap_or_else(now))
    }
}
