//! Local inspection of access tokens
//!
//! The signature is not checked here; the server does that. Decoding `exp`
//! only lets the client skip requests that would certainly fail.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// `exp` claim of a JWT, if the payload can be decoded
pub fn decode_expiry(token: &str) -> Option<i64> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&bytes).ok()?;
    Some(claim.exp)
}

/// Whether the token is still usable `margin_secs` from `now`
///
/// Undecodable tokens are never fresh.
pub fn is_fresh(token: &str, now: i64, margin_secs: i64) -> bool {
    decode_expiry(token).is_some_and(|exp| exp > now + margin_secs)
}

#[cfg(test)]
pub(crate) fn unsigned_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"x","exp":{exp}}}"#));
    format!("{header}.{payload}.c2lnbmF0dXJl")
}
