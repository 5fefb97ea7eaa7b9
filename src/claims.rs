use crate::error::Error;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

/// Claims read off an access token payload. The token is never verified;
/// it is only inspected for tenant routing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct TokenClaims {
    pub tid: Option<String>,
}

/// Decodes the second base64url segment of a compact JWT as JSON claims.
pub(crate) fn decode_claims(token: &str) -> Result<TokenClaims, Error> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err(claims_error("token is not in compact JWS form")),
    };
    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| claims_error(&format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&decoded)
        .map_err(|e| claims_error(&format!("payload is not JSON: {e}")))
}

/// Extracts the `tid` claim identifying the tenant the token was issued for.
pub(crate) fn tenant_from_token(token: &str) -> Result<String, Error> {
    decode_claims(token)?
        .tid
        .filter(|tid| !tid.is_empty())
        .ok_or_else(|| claims_error("payload has no tid claim"))
}

fn claims_error(message: &str) -> Error {
    Error::Claims(message.to_string())
}
