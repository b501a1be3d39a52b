//! Example showing how to drive the workflow from any web framework.
//! The transport is stubbed so this runs without network access.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use toastkit::prelude::*;

// Simulated request from any web framework
struct GenericRequest {
    pub headers: Vec<(String, String)>,
    pub query: Option<String>,
    pub body: Vec<u8>,
}

// Simulated response for any web framework
struct GenericResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl From<TriggerResponse> for GenericResponse {
    fn from(response: TriggerResponse) -> Self {
        Self {
            status: response.status.as_u16(),
            content_type: response.content_type,
            body: response.body,
        }
    }
}

/// Answers every call the way the Toast API acknowledges a send.
struct EchoFactory;

impl HttpClientFactory for EchoFactory {
    fn create_client(&self, _name: &str) -> Arc<dyn HttpClient> {
        Arc::new(EchoFactory)
    }
}

#[async_trait]
impl HttpClient for EchoFactory {
    async fn send(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        println!("-> {} {}", request.method, request.url);
        Ok(OutboundResponse {
            status: 200,
            body: br#"{"header":{"isSuccessful":true,"resultCode":0,"resultMessage":"SUCCESS"},"body":{"data":{"requestId":"demo"}}}"#.to_vec(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendSms {
    body: String,
    send_no: String,
}

async fn handle(context: &TriggerContext, settings: &EndpointSettings, req: GenericRequest) -> GenericResponse {
    // 1. Convert the framework request
    let mut inbound = InboundRequest::new(req.headers).with_body(req.body);
    inbound.query = req.query;

    // 2. Run the workflow
    let mut workflow = context.workflow();
    let result = async {
        workflow
            .validate_header(&inbound)?
            .validate_body::<SendSms, _>(&inbound, &AcceptAll)?
            .build_request_url("sender/sms", Some(settings))?;
        workflow.invoke::<serde_json::Value>(HttpMethod::Post).await
    }
    .await;

    // 3. Convert back to the framework response
    respond(result).into()
}

#[tokio::main]
async fn main() {
    println!("=== Toast SMS Generic Integration Example ===");

    let context = TriggerContext::new(Arc::new(EchoFactory));
    let settings = EndpointSettings::new(
        "https://api-sms.cloud.toast.com/sms/{version}/appKeys/{appKey}",
        "v3.0",
    );

    let requests = [
        GenericRequest {
            // appkey:secret
            headers: vec![("authorization".into(), "Basic YXBwa2V5OnNlY3JldA==".into())],
            query: None,
            body: br#"{"body":"hello","sendNo":"15446859"}"#.to_vec(),
        },
        GenericRequest {
            headers: vec![("authorization".into(), "Bearer token".into())],
            query: None,
            body: Vec::new(),
        },
    ];

    for request in requests {
        let response = handle(&context, &settings, request).await;
        println!("Response Status: {}", response.status);
        println!("Response Content-Type: {}", response.content_type);
        println!("Response Body: {}", response.body);
    }
}
