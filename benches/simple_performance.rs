use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use toast_workflow::codec::decode_basic_auth;
use toastkit::prelude::*;

struct StaticFactory;

impl HttpClientFactory for StaticFactory {
    fn create_client(&self, _name: &str) -> Arc<dyn HttpClient> {
        Arc::new(StaticFactory)
    }
}

#[async_trait]
impl HttpClient for StaticFactory {
    async fn send(&self, _request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        Ok(OutboundResponse {
            status: 200,
            body: br#"{"header":{"isSuccessful":true,"resultCode":0,"resultMessage":"SUCCESS"}}"#
                .to_vec(),
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendSms {
    send_no: String,
    body: String,
}

fn authorization(secret_len: usize) -> Headers {
    let secret = "s".repeat(secret_len);
    vec![(
        "Authorization".to_string(),
        format!("Basic {}", STANDARD.encode(format!("appkey:{secret}"))),
    )]
}

fn benchmark_credential_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("credential_decoding");

    for size in [16, 256, 4096] {
        let headers = authorization(size);
        group.bench_with_input(BenchmarkId::new("decode_basic_auth", size), &headers, |b, headers| {
            b.iter(|| black_box(decode_basic_auth(Some(headers))))
        });
    }
    group.finish();
}

fn benchmark_url_building(c: &mut Criterion) {
    let settings = EndpointSettings::new(
        "https://api-sms.cloud.toast.com/sms/{version}/appKeys/{appKey}/",
        "v3.0",
    );
    let credentials = Credentials::new("appkey", "secret");

    c.bench_function("request_url_build", |b| {
        b.iter(|| {
            let builder = RequestUrlBuilder::new()
                .with_settings(Some(&settings))
                .map(|builder| {
                    builder
                        .with_credentials(&credentials)
                        .with_operation("sender/sms")
                        .with_query("pageNum=1&pageSize=15")
                });
            black_box(builder.and_then(|builder| builder.build()))
        })
    });
}

fn benchmark_full_workflow(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let context = TriggerContext::new(Arc::new(StaticFactory));
    let settings = EndpointSettings::new("http://localhost:7071/api/{version}/appKeys/{appKey}", "v3.0");
    let request = InboundRequest::new(authorization(16))
        .with_body(br#"{"sendNo":"15446859","body":"hello"}"#.to_vec());

    c.bench_function("workflow_post", |b| {
        b.to_async(&rt).iter(|| async {
            let mut workflow = context.workflow();
            workflow
                .validate_header(&request)
                .and_then(|w| w.validate_body::<SendSms, _>(&request, &AcceptAll))
                .and_then(|w| w.build_request_url("sender/sms", Some(&settings)))
                .unwrap();
            black_box(
                workflow
                    .invoke::<serde_json::Value>(HttpMethod::Post)
                    .await
                    .unwrap(),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_credential_decoding,
    benchmark_url_building,
    benchmark_full_workflow
);
criterion_main!(benches);
