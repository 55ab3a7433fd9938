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
use ksign_core::utils::Redact;
use ksign_core::Context;
use std::fmt::{Debug, Formatter};

/// Config for KsYun services.
///
/// Every field is optional. Values set explicitly always win over values
/// found in the environment.
#[derive(Clone, Default)]
pub struct Config {
    /// Access key id, loaded from `KSYUN_ACCESS_KEY_ID` if unset.
    pub access_key_id: Option<String>,
    /// Secret access key, loaded from `KSYUN_SECRET_ACCESS_KEY` if unset.
    pub secret_access_key: Option<String>,
    /// Region such as `cn-beijing-6`, loaded from `KSYUN_REGION` if unset.
    pub region: Option<String>,
    /// Service name such as `kec`, loaded from `KSYUN_SERVICE` if unset.
    pub service: Option<String>,
    /// Endpoint such as `kec.api.ksyun.com`, loaded from `KSYUN_ENDPOINT` if unset.
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("region", &self.region)
            .field("service", &self.service)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Config {
    /// Set the access key id.
    pub fn with_access_key_id(mut self, v: impl Into<String>) -> Self {
        self.access_key_id = Some(v.into());
        self
    }

    /// Set the secret access key.
    pub fn with_secret_access_key(mut self, v: impl Into<String>) -> Self {
        self.secret_access_key = Some(v.into());
        self
    }

    /// Set the region.
    pub fn with_region(mut self, v: impl Into<String>) -> Self {
        self.region = Some(v.into());
        self
    }

    /// Set the service name.
    pub fn with_service(mut self, v: impl Into<String>) -> Self {
        self.service = Some(v.into());
        self
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, v: impl Into<String>) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Fill unset fields from environment variables.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let fill = |field: &mut Option<String>, key: &str| {
            if field.is_none() {
                *field = ctx.env_var(key).filter(|v| !v.is_empty());
            }
        };

        fill(&mut self.access_key_id, KSYUN_ACCESS_KEY_ID);
        fill(&mut self.secret_access_key, KSYUN_SECRET_ACCESS_KEY);
        fill(&mut self.region, KSYUN_REGION);
        fill(&mut self.service, KSYUN_SERVICE);
        fill(&mut self.endpoint, KSYUN_ENDPOINT);

        self
    }
}
