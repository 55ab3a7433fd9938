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

use crate::{
    Context, Error, ProvideCredential, Result, SignRequest, SigningCredential, SigningRequest,
};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// It pairs a credential provider with a request signer and caches the last
/// valid credential, so providers are only consulted when the cached one is
/// missing or no longer valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Context shared by the loader and the builder.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Sign the request in place.
    ///
    /// Fails with a signing error when no valid credential can be loaded.
    pub async fn sign(&self, req: &mut SigningRequest) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            let loaded = self.loader.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        if !credential.is_valid() {
            return Err(Error::signing(
                "no valid credential found, refusing to send the request unsigned",
            ));
        }

        self.builder
            .sign_request(&self.ctx, req, credential.as_ref())
            .await
    }
}
