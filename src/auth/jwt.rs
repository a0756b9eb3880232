use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
#[cfg(test)]
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience and role Supabase puts in tokens of signed-in users.
pub const AUTHENTICATED: &str = "authenticated";

/// Claims of a Supabase access token. Only `sub` and `exp` are relied on.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: usize,  // Expiry timestamp
    #[serde(default)]
    pub iat: usize, // Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Ok(Uuid::parse_str(&self.sub)?)
    }
}

/// Verifies HS256 tokens signed with the project's JWT secret.
pub struct JwtService {
    #[cfg(test)]
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            #[cfg(test)]
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Issues a token shaped like a Supabase session token, for tests of
    /// the authenticated routes. Production tokens come from Supabase.
    #[cfg(test)]
    pub(crate) fn generate_token(&self, user_id: Uuid) -> Result<String> {
        use chrono::{Duration, Utc};

        let now = Utc::now();
        let expires_at = now + Duration::hours(1);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
            aud: Some(AUTHENTICATED.to_string()),
            role: Some(AUTHENTICATED.to_string()),
            email: None,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // Allow 60 seconds clock skew
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}
