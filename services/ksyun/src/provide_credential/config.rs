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

use crate::{Config, Credential};
use async_trait::async_trait;
use ksign_core::{Context, ProvideCredential, Result};
use std::sync::Arc;

/// ConfigCredentialProvider returns the access key pair of a [`Config`].
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new `ConfigCredentialProvider` instance.
    pub fn new(cfg: Arc<Config>) -> Self {
        Self { config: cfg }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        let (Some(ak), Some(sk)) = (&self.config.access_key_id, &self.config.secret_access_key)
        else {
            return Ok(None);
        };

        Ok(Some(Credential::new(ak.clone(), sk.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_credential_provider() -> anyhow::Result<()> {
        let cfg = Config::default()
            .with_access_key_id("cfg_ak")
            .with_secret_access_key("cfg_sk");

        let cred = ConfigCredentialProvider::new(Arc::new(cfg))
            .provide_credential(&Context::new())
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.access_key_id, "cfg_ak");
        assert_eq!(cred.secret_access_key, "cfg_sk");

        let cred = ConfigCredentialProvider::new(Arc::new(Config::default()))
            .provide_credential(&Context::new())
            .await?;
        assert!(cred.is_none());

        Ok(())
    }
}
