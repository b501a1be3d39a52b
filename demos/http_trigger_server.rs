//! Run an Axum server that validates inbound SMS requests and forwards them
//! to the Toast SMS API.
//!
//! ```text
//! TOASTKIT__ENDPOINT__BASE_URL='https://api-sms.cloud.toast.com/sms/{version}/appKeys/{appKey}' \
//! TOASTKIT__ENDPOINT__VERSION=v3.0 \
//! cargo run --example http_trigger_server
//!
//! curl -u "$APP_KEY:$SECRET_KEY" -H 'content-type: application/json' \
//!   -d '{"body":"hello","sendNo":"15446859","recipientList":[{"recipientNo":"01000000000"}]}' \
//!   http://localhost:7071/api/sender/sms
//! ```

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use toastkit::prelude::*;

type SharedState = AppState<ConfiguredSettings>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Recipient {
    recipient_no: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendSms {
    body: String,
    send_no: String,
    recipient_list: Vec<Recipient>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    request_id: Option<String>,
    page_num: Option<u32>,
    page_size: Option<u32>,
}

fn check_send(request: &SendSms) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if request.body.trim().is_empty() {
        errors.push("body", "must not be empty");
    }
    if request.send_no.trim().is_empty() {
        errors.push("sendNo", "must not be empty");
    }
    if request.recipient_list.is_empty() {
        errors.push("recipientList", "at least one recipient is required");
    }
    errors.into_result()
}

fn check_list(query: &ListQuery) -> Result<(), ValidationErrors> {
    match query.page_size {
        Some(size) if size > 1000 => Err(ValidationErrors::single("pageSize", "must be at most 1000")),
        _ => Ok(()),
    }
}

async fn send_sms(State(state): State<SharedState>, request: Request) -> Response {
    let inbound = match read_inbound(request, 1024 * 1024).await {
        Ok(inbound) => inbound,
        Err(response) => return response,
    };

    let mut workflow = state.context.workflow();
    let result = async {
        workflow
            .validate_header(&inbound)?
            .validate_body::<SendSms, _>(&inbound, &check_send)?
            .build_request_url("sender/sms", state.settings.endpoint_settings())?;
        workflow.invoke::<serde_json::Value>(HttpMethod::Post).await
    }
    .await;

    AxumTriggerResponse(respond(result)).into_response()
}

async fn list_sms(State(state): State<SharedState>, request: Request) -> Response {
    let inbound = match read_inbound(request, 1024).await {
        Ok(inbound) => inbound,
        Err(response) => return response,
    };

    let mut workflow = state.context.workflow();
    let result = async {
        workflow
            .validate_header(&inbound)?
            .validate_queries::<ListQuery, _>(&inbound, &check_list)?
            .build_request_url("sender/sms", state.settings.endpoint_settings())?;
        workflow.invoke::<serde_json::Value>(HttpMethod::Get).await
    }
    .await;

    AxumTriggerResponse(respond(result)).into_response()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let state = AppState {
        context: trigger_context(&config)?,
        settings: ConfiguredSettings::from(&config),
    };
    if state.settings.endpoint_settings().is_none() {
        tracing::warn!("no endpoint configured; every request will fail with settings_missing");
    }

    let app = Router::new()
        .route("/api/sender/sms", post(send_sms).get(list_sms))
        .with_state(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
