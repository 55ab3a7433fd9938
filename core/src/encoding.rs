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

//! Percent-encoding used for canonicalization and on the wire.

use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::ParameterSet;

/// Encode set for resource paths: everything but unreserved chars and `/`.
///
/// Space becomes `%20`, `*` becomes `%2A` and `~` stays literal.
pub static URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode set for query keys and values, `/` is encoded as well.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode a resource path, an empty path becomes `/`.
pub fn encode_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let encoded = utf8_percent_encode(path, &URI_ENCODE_SET).to_string();
    if encoded.starts_with('/') {
        encoded
    } else {
        format!("/{encoded}")
    }
}

/// Encode a single query key or value.
pub fn encode_query(v: &str) -> String {
    utf8_percent_encode(v, &QUERY_ENCODE_SET).to_string()
}

/// Build the canonical query string of `params`.
///
/// Keys and values are encoded first, then pairs are sorted by encoded key
/// and joined as `k=v&k=v`.
///
/// ```
/// use ksign_core::encoding::canonical_query;
/// use ksign_core::ParameterSet;
///
/// let params: ParameterSet = [("b", "2"), ("a", "1 *")].into_iter().collect();
/// assert_eq!(canonical_query(&params), "a=1%20%2A&b=2");
/// ```
pub fn canonical_query(params: &ParameterSet) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode_query(k), encode_query(v)))
        .collect();
    pairs.sort();

    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Serialize `params` as an `application/x-www-form-urlencoded` body in key
/// order.
pub fn form_body(params: &ParameterSet) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}
