//! HS256 access tokens
//!
//! Each token carries the id of the server-side session it was issued for,
//! so logging out (deleting the session) revokes it before `exp`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Access token expiry in seconds (7 days)
pub const ACCESS_TOKEN_EXPIRY: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id
    pub sub: i64,
    pub username: String,
    /// Session id
    pub sid: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

fn sign(signing_input: &str, secret: &str) -> Result<HmacSha256, String> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| format!("HMAC error: {}", e))?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

fn encode_jwt<T: Serialize>(claims: &T, secret: &str) -> Result<String, String> {
    let header_json = serde_json::to_string(&JwtHeader::default()).map_err(|e| e.to_string())?;
    let header_b64 = URL_SAFE_NO_PAD.encode(header_json.as_bytes());

    let payload_json = serde_json::to_string(claims).map_err(|e| e.to_string())?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());

    let signing_input = format!("{}.{}", header_b64, payload_b64);
    let signature = sign(&signing_input, secret)?.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

fn decode_jwt<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, String> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err("Invalid token format".to_string());
    };

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| "Invalid signature encoding")?;
    sign(&format!("{}.{}", header_b64, payload_b64), secret)?
        .verify_slice(&signature)
        .map_err(|_| "Invalid signature")?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| "Invalid header encoding")?;
    let header: JwtHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| "Invalid header format")?;
    if header.alg != "HS256" {
        return Err("Unsupported algorithm".to_string());
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| "Invalid payload encoding")?;
    serde_json::from_slice(&payload_bytes).map_err(|_| "Invalid payload format".to_string())
}

/// Issue an access token for a user's session, valid from `now`
pub fn generate_access_token(
    user_id: i64,
    username: &str,
    session_id: &str,
    now: i64,
    secret: &str,
) -> Result<String, String> {
    let claims = AccessTokenClaims {
        sub: user_id,
        username: username.to_string(),
        sid: session_id.to_string(),
        iat: now,
        exp: now + ACCESS_TOKEN_EXPIRY,
    };

    encode_jwt(&claims, secret).map_err(|e| format!("Failed to generate access token: {}", e))
}

/// Verify signature and expiry (against `now`) and return the claims
pub fn validate_access_token(
    token: &str,
    secret: &str,
    now: i64,
) -> Result<AccessTokenClaims, String> {
    let claims: AccessTokenClaims =
        decode_jwt(token, secret).map_err(|e| format!("Invalid access token: {}", e))?;

    if claims.exp < now {
        return Err("Access token expired".to_string());
    }

    Ok(claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<String> {
    auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
    const NOW: i64 = 1_760_000_000;

    #[test]
    fn test_access_token_generation_and_validation() {
        let token = generate_access_token(42, "ann", "session-1", NOW, TEST_SECRET).unwrap();
        let claims = validate_access_token(&token, TEST_SECRET, NOW + 60).unwrap();

        assert_eq!(
            claims,
            AccessTokenClaims {
                sub: 42,
                username: "ann".into(),
                sid: "session-1".into(),
                iat: NOW,
                exp: NOW + ACCESS_TOKEN_EXPIRY,
            }
        );
    }

    #[test]
    fn test_expired_token() {
        let token = generate_access_token(1, "ann", "s", NOW, TEST_SECRET).unwrap();
        let result = validate_access_token(&token, TEST_SECRET, NOW + ACCESS_TOKEN_EXPIRY + 1);
        assert_eq!(result, Err("Access token expired".to_string()));
    }

    #[test]
    fn test_invalid_token() {
        assert!(validate_access_token("invalid-token", TEST_SECRET, NOW).is_err());
        assert!(validate_access_token("a.b.c.d", TEST_SECRET, NOW).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_access_token(1, "ann", "s", NOW, TEST_SECRET).unwrap();
        assert!(validate_access_token(&token, "wrong-secret", NOW).is_err());
    }

    #[test]
    fn test_tampered_payload() {
        let token = generate_access_token(1, "ann", "s", NOW, TEST_SECRET).unwrap();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            br#"{"sub":2,"username":"admin","sid":"s","iat":1760000000,"exp":9999999999}"#,
        );
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_claims;
        assert!(validate_access_token(&parts.join("."), TEST_SECRET, NOW).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(Some("Bearer abc123")),
            Some("abc123".to_string())
        );
        assert_eq!(extract_bearer_token(Some("Basic abc123")), None);
        assert_eq!(extract_bearer_token(Some("Bearer ")), None);
        assert_eq!(extract_bearer_token(None), None);
    }
}
