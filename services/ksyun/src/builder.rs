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
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use ksign_core::field::RequestObject;
use ksign_core::json::to_json;
use ksign_core::{flatten, Error, ParameterSet, Result, SigningRequest};

/// RequestBuilder assembles the [`SigningRequest`] of one API call.
///
/// Request objects are flattened into parameters, or rendered as a JSON body
/// with [`json_object`](RequestBuilder::json_object). The built request
/// always carries `Host` and `Accept: application/json`, body methods default
/// to a form encoded body. Headers set by the caller win over defaults.
///
/// ```
/// use http::Method;
/// use ksign_ksyun::RequestBuilder;
///
/// let req = RequestBuilder::new(Method::GET, "kec.api.ksyun.com")
///     .action("DescribeInstances")
///     .version("2016-03-04")
///     .param("MaxResults", "10")
///     .build()?;
/// assert_eq!(
///     req.uri()?.to_string(),
///     "http://kec.api.ksyun.com/?Action=DescribeInstances&MaxResults=10&Version=2016-03-04"
/// );
/// # Ok::<(), ksign_core::Error>(())
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    endpoint: String,
    path: Option<String>,
    headers: HeaderMap,
    params: ParameterSet,
    json: Option<serde_json::Value>,

    err: Option<Error>,
}

impl RequestBuilder {
    /// Start a request to `endpoint`, with or without scheme.
    ///
    /// Endpoints without scheme are reached over `http`.
    pub fn new(method: Method, endpoint: &str) -> Self {
        Self {
            method,
            endpoint: endpoint.to_string(),
            path: None,
            headers: HeaderMap::new(),
            params: ParameterSet::new(),
            json: None,

            err: None,
        }
    }

    /// Set the resource path, `/` by default.
    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Set the `Action` parameter.
    pub fn action(self, action: &str) -> Self {
        self.param(PARAM_ACTION, action)
    }

    /// Set the `Version` parameter.
    pub fn version(self, version: &str) -> Self {
        self.param(PARAM_VERSION, version)
    }

    /// Add a single parameter.
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Set a header, replacing any default of the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.err.is_some() {
            return self;
        }

        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.err = Some(e.into()),
            (_, Err(e)) => self.err = Some(e.into()),
        }
        self
    }

    /// Set the `Content-Type` header.
    pub fn content_type(self, content_type: &str) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Flatten `obj` and add its parameters.
    pub fn object(mut self, obj: &dyn RequestObject) -> Self {
        if self.err.is_some() {
            return self;
        }

        match flatten(obj, "") {
            Ok(params) => self.params.extend(params),
            Err(e) => self.err = Some(e),
        }
        self
    }

    /// Send `obj` as a JSON body, keeping its nesting.
    pub fn json_object(mut self, obj: &dyn RequestObject) -> Self {
        if self.err.is_some() {
            return self;
        }

        match to_json(obj) {
            Ok(v) => {
                self.json = Some(v);
                return self.content_type(CONTENT_TYPE_JSON);
            }
            Err(e) => self.err = Some(e),
        }
        self
    }

    /// Build the request.
    pub fn build(self) -> Result<SigningRequest> {
        if let Some(err) = self.err {
            return Err(err);
        }

        let url = if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("http://{}", self.endpoint)
        };
        let mut req = SigningRequest::new(self.method, &url)
            .map_err(|e| Error::request_invalid(format!("invalid endpoint '{url}'")).with_source(e))?;

        if let Some(path) = self.path {
            req.path = path;
        }
        req.params.extend(self.params);

        if self.json.is_some() && !req.has_body() {
            return Err(Error::request_invalid(format!(
                "{} request can't carry a json body",
                req.method
            )));
        }
        req.json = self.json;

        req.headers
            .insert(header::HOST, req.authority.as_str().parse()?);
        req.headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(CONTENT_TYPE_JSON),
        );
        if req.has_body() {
            req.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(CONTENT_TYPE_FORM),
            );
        }
        for (name, value) in self.headers {
            if let Some(name) = name {
                req.headers.insert(name, value);
            }
        }

        Ok(req)
    }
}
