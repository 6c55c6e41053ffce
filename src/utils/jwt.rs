use crate::error::{AppError, AppResult};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access-token claims as issued by the hosted auth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id (uuid)
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Identity attached to the request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    audience: String,
}

impl JwtService {
    pub fn new(secret: &str, audience: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience: audience.to_string(),
        }
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let claims = self.verify_token(token)?;

        if claims.role.as_deref() != Some("authenticated") {
            return Err(AppError::AuthError("Invalid access token role".to_string()));
        }

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::AuthError("Invalid access token subject".to_string()))?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
pub(crate) fn issue_test_token(secret: &str, user_id: Uuid, email: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: String,
        email: &'a str,
        role: &'a str,
        aud: &'a str,
        exp: i64,
        iat: i64,
    }

    let now = chrono::Utc::now().timestamp();
    let claims = TestClaims {
        sub: user_id.to_string(),
        email,
        role: "authenticated",
        aud: "authenticated",
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
