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

//! KsYun (Kingsoft Cloud) OpenAPI signing.
//!
//! This crate assembles, signs and sends KsYun API requests:
//!
//! - [`RequestBuilder`] turns request objects into a [`SigningRequest`](ksign_core::SigningRequest).
//! - [`RequestSigner`] signs it with the v4 `AWS4-HMAC-SHA256` scheme.
//! - [`QuerySigner`] signs it with the legacy signature version `1.0`.
//! - [`Client`] signs and sends it through the context transport.
//!
//! ## Example
//!
//! ```no_run
//! use http::Method;
//! use ksign_core::field::{Field, FieldDescriptor, RequestObject};
//! use ksign_core::{Context, OsEnv};
//! use ksign_ksyun::{Client, Config};
//!
//! struct DescribeInstances {
//!     instance_ids: Vec<String>,
//! }
//!
//! impl RequestObject for DescribeInstances {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![Field::scalars(FieldDescriptor::new("InstanceId"), Some(&self.instance_ids))]
//!     }
//! }
//!
//! # async fn example() -> ksign_core::Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let client = Client::from_config(
//!     ctx,
//!     Config::default()
//!         .with_region("cn-beijing-6")
//!         .with_service("kec")
//!         .with_endpoint("kec.api.ksyun.com"),
//! )?;
//!
//! let req = client
//!     .request(Method::GET)?
//!     .action("DescribeInstances")
//!     .version("2016-03-04")
//!     .object(&DescribeInstances {
//!         instance_ids: vec!["i-1".to_string()],
//!     })
//!     .build()?;
//! let resp = client.send(req).await?;
//! println!("request id: {:?}", resp.request_id);
//! # Ok(())
//! # }
//! ```

mod builder;
pub use builder::RequestBuilder;

mod client;
pub use client::{Client, Response, ServiceError};

mod config;
pub use config::Config;

mod constants;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_query;
pub use sign_query::QuerySigner;

mod sign_request;
pub use sign_request::{RequestSigner, SignedHeaders};
