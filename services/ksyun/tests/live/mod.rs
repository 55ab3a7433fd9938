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

use std::env;

use anyhow::Result;
use http::Method;
use ksign_core::{Context, OsEnv};
use ksign_http_send_reqwest::ReqwestHttpSend;
use ksign_ksyun::{Client, Config};
use log::warn;

/// Build a client against the real service.
///
/// Requires `KSIGN_KSYUN_TEST=on` plus the usual `KSYUN_*` variables.
fn init_live_test() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();

    if env::var("KSIGN_KSYUN_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::default());
    let client = Client::from_config(ctx, Config::default())
        .expect("KSYUN_REGION and KSYUN_SERVICE must be set");
    Some(client)
}

#[tokio::test]
async fn test_describe_regions() -> Result<()> {
    let Some(client) = init_live_test() else {
        warn!("KSIGN_KSYUN_TEST is not set, skipped");
        return Ok(());
    };

    let req = client
        .request(Method::GET)?
        .action("DescribeRegions")
        .version("2016-03-04")
        .build()?;

    let resp = client.send(req).await?;
    assert!(resp.request_id.is_some());
    Ok(())
}

#[tokio::test]
async fn test_describe_regions_form_post() -> Result<()> {
    let Some(client) = init_live_test() else {
        warn!("KSIGN_KSYUN_TEST is not set, skipped");
        return Ok(());
    };

    let req = client
        .request(Method::POST)?
        .action("DescribeRegions")
        .version("2016-03-04")
        .build()?;

    let resp = client.send(req).await?;
    assert!(resp.status.is_success());
    Ok(())
}
