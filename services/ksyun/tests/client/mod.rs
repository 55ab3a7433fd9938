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

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Method, StatusCode};
use ksign_core::{Context, ErrorKind, HttpSend, Signer, StaticEnv};
use ksign_ksyun::{
    Client, Config, DefaultCredentialProvider, RequestBuilder, RequestSigner,
    StaticCredentialProvider,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;

/// Records every request and answers with a canned response.
#[derive(Debug, Clone)]
struct MockHttpSend {
    status: StatusCode,
    body: &'static str,
    sent: Arc<Mutex<Vec<http::Request<Bytes>>>>,
}

impl MockHttpSend {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            sent: Arc::default(),
        }
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> ksign_core::Result<http::Response<Bytes>> {
        self.sent.lock().unwrap().push(req);

        let resp = http::Response::builder()
            .status(self.status)
            .body(Bytes::from_static(self.body.as_bytes()))?;
        Ok(resp)
    }
}

fn client(http: MockHttpSend) -> Client {
    let ctx = Context::new().with_http_send(http);
    Client::new(Signer::new(
        ctx,
        StaticCredentialProvider::new("AKLTclient", "client-secret"),
        RequestSigner::new("kec", "cn-beijing-6"),
    ))
}

#[derive(Debug, Deserialize)]
struct DescribeInstancesResponse {
    #[serde(rename = "InstanceCount")]
    instance_count: u32,
}

#[tokio::test]
async fn test_send_signs_and_decodes() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let http = MockHttpSend::new(
        StatusCode::OK,
        r#"{"RequestId":"req-1","InstanceCount":2}"#,
    );
    let client = client(http.clone());

    let req = RequestBuilder::new(Method::POST, "kec.api.ksyun.com")
        .action("RunInstances")
        .object(&super::run_instances())
        .build()?;
    let payload = req.payload()?;

    let resp = client.send(req).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.request_id.as_deref(), Some("req-1"));
    assert_eq!(resp.json::<DescribeInstancesResponse>()?.instance_count, 2);

    let sent = http.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let authorization = sent[0].headers()[header::AUTHORIZATION].to_str()?;
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKLTclient/"));
    assert!(authorization.contains("/cn-beijing-6/kec/aws4_request"));
    assert!(authorization.contains("SignedHeaders=accept;content-type;host;x-amz-date"));
    assert_eq!(sent[0].body().as_ref(), payload.as_slice());
    Ok(())
}

#[tokio::test]
async fn test_send_maps_error_envelope() -> Result<()> {
    let http = MockHttpSend::new(
        StatusCode::BAD_REQUEST,
        r#"{"RequestId":"req-2","Error":{"Type":"Sender","Code":"InvalidParameter","Message":"ImageId is invalid"}}"#,
    );
    let client = client(http);

    let req = RequestBuilder::new(Method::GET, "kec.api.ksyun.com")
        .action("DescribeImages")
        .build()?;

    let err = client.send(req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(err.to_string().contains("InvalidParameter"));
    assert!(err.to_string().contains("req-2"));
    assert!(err.to_string().contains("ImageId is invalid"));
    Ok(())
}

#[tokio::test]
async fn test_send_maps_non_success_status() -> Result<()> {
    let client = client(MockHttpSend::new(StatusCode::BAD_GATEWAY, "upstream down"));

    let req = RequestBuilder::new(Method::GET, "kec.api.ksyun.com").build()?;

    let err = client.send(req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(err.to_string().contains("upstream down"));
    Ok(())
}

#[tokio::test]
async fn test_send_never_sends_unsigned() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, "{}");
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_env(StaticEnv::default());
    let client = Client::new(Signer::new(
        ctx,
        DefaultCredentialProvider::default(),
        RequestSigner::new("kec", "cn-beijing-6"),
    ));

    let req = RequestBuilder::new(Method::GET, "kec.api.ksyun.com").build()?;

    let err = client.send(req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Signing);
    assert!(http.sent.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_client_from_config() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, r#"{"RequestId":"req-3"}"#);
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_env(StaticEnv {
            envs: HashMap::from([
                ("KSYUN_ACCESS_KEY_ID".to_string(), "AKLTenv".to_string()),
                ("KSYUN_SECRET_ACCESS_KEY".to_string(), "env-secret".to_string()),
                ("KSYUN_ENDPOINT".to_string(), "https://iam.api.ksyun.com".to_string()),
            ]),
        });

    let client = Client::from_config(
        ctx,
        Config::default().with_region("cn-beijing-6").with_service("iam"),
    )?;
    let req = client
        .request(Method::GET)?
        .action("ListUsers")
        .version("2015-11-01")
        .build()?;
    let resp = client.send(req).await?;
    assert_eq!(resp.request_id.as_deref(), Some("req-3"));

    let sent = http.sent.lock().unwrap();
    assert_eq!(
        sent[0].uri().to_string(),
        "https://iam.api.ksyun.com/?Action=ListUsers&Version=2015-11-01"
    );
    assert!(sent[0].headers()[header::AUTHORIZATION]
        .to_str()?
        .contains("Credential=AKLTenv/"));
    Ok(())
}

#[test]
fn test_client_from_config_requires_region() {
    let err = Client::from_config(Context::new(), Config::default().with_service("kec"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}
