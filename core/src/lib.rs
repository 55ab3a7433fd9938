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

//! Core components for building and signing KsYun API requests.
//!
//! This crate provides the service independent half of the ksign ecosystem:
//! turning typed request objects into wire parameters, describing the exact
//! request that will be sent, and the abstractions that connect credential
//! loading with request signing.
//!
//! ## Overview
//!
//! - **Request objects**: types implement [`field::RequestObject`] to list
//!   their fields with a [`field::FieldDescriptor`] each.
//! - **Flattening**: [`flatten`] walks a request object into a
//!   [`ParameterSet`], [`json::to_json`] keeps it nested instead.
//! - **SigningRequest**: the exact method, path, parameters, headers and body
//!   that go on the wire.
//! - **Traits**: [`ProvideCredential`] loads credentials and [`SignRequest`]
//!   signs a [`SigningRequest`] with them.
//! - **Signer**: caches credentials and drives both traits.
//!
//! ## Example
//!
//! ```
//! use ksign_core::field::{Field, FieldDescriptor, RequestObject};
//! use ksign_core::flatten;
//!
//! struct DescribeInstances {
//!     instance_ids: Vec<String>,
//!     max_results: Option<i32>,
//! }
//!
//! impl RequestObject for DescribeInstances {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::scalars(FieldDescriptor::new("InstanceId"), Some(&self.instance_ids)),
//!             Field::scalar(FieldDescriptor::new("MaxResults"), &self.max_results),
//!         ]
//!     }
//! }
//!
//! let req = DescribeInstances {
//!     instance_ids: vec!["i-1".to_string(), "i-2".to_string()],
//!     max_results: None,
//! };
//! let params = flatten(&req, "")?;
//! assert_eq!(params.get("InstanceId.1"), Some("i-1"));
//! assert_eq!(params.get("InstanceId.2"), Some("i-2"));
//! assert!(!params.contains_key("MaxResults"));
//! # Ok::<(), ksign_core::Error>(())
//! ```
//!
//! ## Traits
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//! - [`ProvideCredential`]: For loading credentials from various sources
//! - [`SignRequest`]: For service specific request signing
//! - [`SigningCredential`]: For validating credentials
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`encoding`]: Percent-encoding for canonicalization
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod encoding;
pub mod field;
pub mod hash;
pub mod json;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod flatten;
pub use flatten::{flatten, ParameterSet};
mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};
mod api;
pub use api::{ProvideCredential, ProvideCredentialChain, SignRequest, SigningCredential};
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
