use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a sign-in; the access cookie uses the same max-age.
pub const SESSION_HOURS: i64 = 8;

/// Identity only. Roles are looked up on every request, never carried in the token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String) -> Self {
        Self {
            sub: user_id,
            email,
            exp: (Utc::now() + Duration::hours(SESSION_HOURS)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-that-is-long-enough";

    #[test]
    fn token_round_trips() {
        let id = Uuid::now_v7();
        let token = encode_token(&Claims::new(id, "a@b.c".to_string()), SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "a@b.c");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token(&Claims::new(Uuid::now_v7(), "a@b.c".to_string()), SECRET).unwrap();
        assert!(decode_token(&token, "another-secret-entirely-different").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(Uuid::now_v7(), "a@b.c".to_string());
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }
}
