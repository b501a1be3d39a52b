//! Basic `Authorization` decoding and credential checks.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use toast_core::{find_header, Credentials, Headers, WorkflowError};

pub const AUTHORIZATION: &str = "Authorization";
const BASIC_SCHEME: &str = "Basic";

/// Decode `Authorization: Basic <base64(appKey:secretKey)>`.
///
/// Segments are returned verbatim, so blank values pass through here and are
/// rejected by [`validate_credentials`].
pub fn decode_basic_auth(headers: Option<&Headers>) -> Result<Credentials, WorkflowError> {
    let headers = headers.ok_or(WorkflowError::MissingHeader)?;
    let value = find_header(headers, AUTHORIZATION).ok_or_else(|| {
        WorkflowError::UnsupportedScheme(format!("{AUTHORIZATION} header is absent"))
    })?;

    let (scheme, payload) = value
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| WorkflowError::UnsupportedScheme("credential payload is missing".into()))?;
    if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
        return Err(WorkflowError::UnsupportedScheme(format!(
            "scheme `{scheme}` is not {BASIC_SCHEME}"
        )));
    }

    let decoded = STANDARD.decode(payload.trim()).map_err(|err| {
        WorkflowError::UnsupportedScheme(format!("credential is not valid base64: {err}"))
    })?;
    let decoded = String::from_utf8(decoded).map_err(|_| {
        WorkflowError::UnsupportedScheme("credential is not valid UTF-8".into())
    })?;

    match decoded.split_once(':') {
        Some((app_key, secret_key)) if !secret_key.contains(':') => {
            Ok(Credentials::new(app_key, secret_key))
        }
        _ => Err(WorkflowError::UnsupportedScheme(
            "credential must contain exactly one `:` separator".into(),
        )),
    }
}

/// Both parts must be non-empty after trimming.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), WorkflowError> {
    if credentials.app_key.trim().is_empty() {
        return Err(WorkflowError::CredentialInvalid { field: "appKey" });
    }
    if credentials.secret_key.trim().is_empty() {
        return Err(WorkflowError::CredentialInvalid { field: "secretKey" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> Headers {
        vec![(
            "Authorization".to_string(),
            format!("Basic {}", STANDARD.encode(raw)),
        )]
    }

    #[test]
    fn missing_header_collection_is_rejected() {
        let err = decode_basic_auth(None).unwrap_err();
        assert!(matches!(err, WorkflowError::MissingHeader));
    }

    #[test]
    fn absent_authorization_is_unsupported() {
        let headers: Headers = vec![("content-type".into(), "application/json".into())];
        let err = decode_basic_auth(Some(&headers)).unwrap_err();
        assert!(matches!(err, WorkflowError::UnsupportedScheme(_)));
    }

    #[test]
    fn scheme_without_payload_is_unsupported() {
        let headers: Headers = vec![("Authorization".into(), "Basic".into())];
        let err = decode_basic_auth(Some(&headers)).unwrap_err();
        assert!(matches!(err, WorkflowError::UnsupportedScheme(_)));
    }

    #[test]
    fn bearer_scheme_is_unsupported() {
        let headers: Headers = vec![("Authorization".into(), "Bearer abc.def".into())];
        let err = decode_basic_auth(Some(&headers)).unwrap_err();
        assert!(matches!(err, WorkflowError::UnsupportedScheme(_)));
    }

    #[test]
    fn non_base64_payload_is_unsupported() {
        let headers: Headers = vec![("Authorization".into(), "Basic ***".into())];
        let err = decode_basic_auth(Some(&headers)).unwrap_err();
        assert!(matches!(err, WorkflowError::UnsupportedScheme(_)));
    }

    #[test]
    fn separator_count_must_be_exactly_one() {
        for raw in ["helloworld", "a:b:c", "hello:world:", "::"] {
            let err = decode_basic_auth(Some(&basic(raw))).unwrap_err();
            assert!(
                matches!(err, WorkflowError::UnsupportedScheme(_)),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn valid_pair_is_preserved_verbatim() {
        let creds = decode_basic_auth(Some(&basic("hello:world"))).unwrap();
        assert_eq!(creds.app_key, "hello");
        assert_eq!(creds.secret_key, "world");
        assert!(validate_credentials(&creds).is_ok());
    }

    #[test]
    fn lowercase_header_and_scheme_are_accepted() {
        let headers: Headers = vec![(
            "authorization".into(),
            format!("basic {}", STANDARD.encode("hello:world")),
        )];
        let creds = decode_basic_auth(Some(&headers)).unwrap();
        assert_eq!(creds.app_key, "hello");
    }

    #[test]
    fn blank_segments_decode_but_fail_validation() {
        let creds = decode_basic_auth(Some(&basic("hello: "))).unwrap();
        assert_eq!(creds.secret_key, " ");
        assert!(matches!(
            validate_credentials(&creds),
            Err(WorkflowError::CredentialInvalid { field: "secretKey" })
        ));

        let creds = decode_basic_auth(Some(&basic(" :world"))).unwrap();
        assert!(matches!(
            validate_credentials(&creds),
            Err(WorkflowError::CredentialInvalid { field: "appKey" })
        ));
    }
}
