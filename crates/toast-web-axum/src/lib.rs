use axum::{
    extract::Request,
    http::{request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use toast_core::{Headers, HttpStatus, InboundRequest, TriggerResponse};
use toast_workflow::{RequestConverter, ResponseConverter, TriggerContext};

#[derive(Clone)]
pub struct AppState<S> {
    pub context: TriggerContext,
    pub settings: S,
}

/// Axum-specific request converter
pub struct AxumRequestConverter;

impl AxumRequestConverter {
    pub fn to_generic_headers(headers: &HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|value| (k.as_str().to_string(), value.to_string()))
            })
            .collect()
    }
}

impl RequestConverter for AxumRequestConverter {
    type RequestType = (Parts, Bytes);

    fn to_inbound((parts, body): Self::RequestType) -> InboundRequest {
        InboundRequest {
            headers: Some(Self::to_generic_headers(&parts.headers)),
            query: parts.uri.query().map(str::to_string),
            body: if body.is_empty() {
                None
            } else {
                Some(body.to_vec())
            },
        }
    }
}

/// Buffer an axum request (up to `limit` bytes of body) into an [`InboundRequest`].
pub async fn read_inbound(request: Request, limit: usize) -> Result<InboundRequest, Response> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        AxumResponseConverter::from_trigger_response(TriggerResponse::error(
            HttpStatus::BadRequest,
            "body_unreadable",
            &err.to_string(),
        ))
    })?;
    Ok(AxumRequestConverter::to_inbound((parts, bytes)))
}

/// Axum-specific response converter
pub struct AxumResponseConverter;

impl ResponseConverter for AxumResponseConverter {
    type ResponseType = Response;

    fn from_trigger_response(response: TriggerResponse) -> Self::ResponseType {
        let status = axum::http::StatusCode::from_u16(response.status.as_u16())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(axum::http::header::CONTENT_TYPE, response.content_type)],
            response.body,
        )
            .into_response()
    }
}

/// Wrapper so handlers can return a [`TriggerResponse`] directly.
pub struct AxumTriggerResponse(pub TriggerResponse);

impl IntoResponse for AxumTriggerResponse {
    fn into_response(self) -> Response {
        AxumResponseConverter::from_trigger_response(self.0)
    }
}

impl From<TriggerResponse> for AxumTriggerResponse {
    fn from(response: TriggerResponse) -> Self {
        Self(response)
    }
}
