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

use std::mem;
use std::str::FromStr;

use bytes::Bytes;
use http::header;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::encoding::canonical_query;
use crate::encoding::encode_path;
use crate::encoding::form_body;
use crate::Error;
use crate::ParameterSet;
use crate::Result;

/// An outbound request in the exact shape it will be transmitted.
///
/// Signers compute signatures over this value, and [`into_request`] turns the
/// very same parts into an [`http::Request`], so the signature always covers
/// what goes on the wire.
///
/// Parameters travel in the query for `GET`, `DELETE`, `HEAD` and `OPTIONS`,
/// and in the body for every other method.
///
/// [`into_request`]: SigningRequest::into_request
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// Decoded resource path.
    pub path: String,
    /// Flattened request parameters.
    pub params: ParameterSet,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// Raw JSON body, sent instead of `params` for body methods.
    pub json: Option<serde_json::Value>,
}

impl SigningRequest {
    /// Build a request from a method and an absolute url.
    ///
    /// Query pairs already present in `url` are moved into `params`.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let uri: Uri = url.parse()?;
        let parts = uri.into_parts();

        let authority = parts.authority.ok_or_else(|| {
            Error::request_invalid(format!("url '{url}' has no host, can't be signed"))
        })?;
        let paq = parts
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        let path = percent_encoding::percent_decode_str(paq.path())
            .decode_utf8()
            .map_err(|e| Error::request_invalid("url path is not valid utf-8").with_source(e))?
            .into_owned();
        let params = paq
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Ok(SigningRequest {
            method,
            scheme: parts.scheme.unwrap_or(Scheme::HTTP),
            authority,
            path,
            params,
            headers: HeaderMap::new(),
            json: None,
        })
    }

    /// Whether this method carries its parameters in the body.
    pub fn has_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    /// Value of the `Content-Type` header, if set and valid.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Whether the content type is `application/json`, ignoring case and
    /// media type parameters.
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(|v| {
            v.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        })
    }

    /// Exact body bytes of this request.
    ///
    /// Empty for query methods. Body methods must carry a `Content-Type`,
    /// the body is JSON when it says so and a sorted form otherwise.
    pub fn payload(&self) -> Result<Vec<u8>> {
        if !self.has_body() {
            return Ok(Vec::new());
        }
        if self.content_type().is_none() {
            return Err(Error::signing(format!(
                "Content-Type is required to sign a {} request",
                self.method
            )));
        }

        if let Some(json) = &self.json {
            return Ok(serde_json::to_vec(json)?);
        }
        if self.is_json() {
            return Ok(serde_json::to_vec(&self.params)?);
        }
        Ok(form_body(&self.params).into_bytes())
    }

    /// Encoded path, always starting with `/`.
    pub fn encoded_path(&self) -> String {
        encode_path(&self.path)
    }

    /// Canonical query string, empty for body methods.
    pub fn canonical_query(&self) -> String {
        if self.has_body() {
            return String::new();
        }
        canonical_query(&self.params)
    }

    /// Header names, lowercased and sorted.
    pub fn header_name_to_vec_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }

    /// Trim leading and trailing spaces of a header value and collapse runs
    /// of inner spaces into one.
    pub fn header_value_normalize(v: &mut HeaderValue) -> Result<()> {
        let mut bs = Vec::with_capacity(v.len());
        for &b in v.as_bytes() {
            if b == b' ' && matches!(bs.last(), None | Some(b' ')) {
                continue;
            }
            bs.push(b);
        }
        if bs.last() == Some(&b' ') {
            bs.pop();
        }

        let mut normalized = HeaderValue::from_bytes(&bs)?;
        normalized.set_sensitive(v.is_sensitive());
        *v = normalized;
        Ok(())
    }

    /// Full request uri with the canonical query.
    pub fn uri(&self) -> Result<Uri> {
        let query = self.canonical_query();
        let paq = if query.is_empty() {
            self.encoded_path()
        } else {
            format!("{}?{query}", self.encoded_path())
        };

        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(PathAndQuery::from_str(&paq)?)
            .build()?;
        Ok(uri)
    }

    /// Turn into an [`http::Request`] ready to be sent.
    ///
    /// `Content-Length` is added here for body methods, after signing.
    pub fn into_request(mut self) -> Result<http::Request<Bytes>> {
        let body = self.payload()?;
        let uri = self.uri()?;

        if self.has_body() {
            self.headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        let mut req = http::Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(Bytes::from(body))?;
        mem::swap(req.headers_mut(), &mut self.headers);
        Ok(req)
    }
}
