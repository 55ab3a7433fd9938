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

// Headers used by the v4 signer.
pub const X_AMZ_DATE: &str = "x-amz-date";

// Signing algorithm identifiers.
pub const ALGORITHM_V4: &str = "AWS4-HMAC-SHA256";
pub const SIGNATURE_METHOD_V1: &str = "HMAC-SHA256";
pub const SIGNATURE_VERSION_V1: &str = "1.0";

// Common parameters of the v1 query signature.
pub const PARAM_ACCESS_KEY: &str = "Accesskey";
pub const PARAM_TIMESTAMP: &str = "Timestamp";
pub const PARAM_SIGNATURE_VERSION: &str = "SignatureVersion";
pub const PARAM_SIGNATURE_METHOD: &str = "SignatureMethod";
pub const PARAM_REGION: &str = "Region";
pub const PARAM_SIGNATURE: &str = "Signature";
pub const PARAM_ACTION: &str = "Action";
pub const PARAM_VERSION: &str = "Version";

// Content types.
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Env values used by ksyun services.
pub const KSYUN_ACCESS_KEY_ID: &str = "KSYUN_ACCESS_KEY_ID";
pub const KSYUN_SECRET_ACCESS_KEY: &str = "KSYUN_SECRET_ACCESS_KEY";
pub const KSYUN_REGION: &str = "KSYUN_REGION";
pub const KSYUN_SERVICE: &str = "KSYUN_SERVICE";
pub const KSYUN_ENDPOINT: &str = "KSYUN_ENDPOINT";
