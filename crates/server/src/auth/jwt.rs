use std::sync::OnceLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{env_parse, env_value};

/// Token type discriminator, so a refresh token is never accepted as an access token.
const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims stored in access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Keeps two tokens issued within the same second distinct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default)]
    pub typ: String,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == super::ADMIN_ROLE
    }
}

/// SHA-256 of a raw JWT, hex-encoded. Only the hash is persisted.
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Signing secret from `JWT_SECRET`. Without one, a per-process random secret
/// is used and every session ends on restart.
fn jwt_secret() -> &'static [u8] {
    static SECRET: OnceLock<String> = OnceLock::new();
    SECRET
        .get_or_init(|| {
            env_value("JWT_SECRET").unwrap_or_else(|| {
                tracing::warn!("JWT_SECRET not set; using an ephemeral signing secret");
                format!("{}{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
            })
        })
        .as_bytes()
}

pub fn access_token_expiry_minutes() -> i64 {
    env_parse("JWT_ACCESS_TOKEN_EXPIRY_MINUTES", 15)
}

pub fn refresh_token_expiry_days() -> i64 {
    env_parse("JWT_REFRESH_TOKEN_EXPIRY_DAYS", 7)
}

fn sign(claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_secret()),
    )
}

fn claims_for(admin_id: i64, email: &str, role: &str, ttl: Duration, typ: &str) -> Claims {
    let now = Utc::now();
    Claims {
        sub: admin_id,
        email: email.to_string(),
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        jti: Some(uuid::Uuid::new_v4().to_string()),
        typ: typ.to_string(),
    }
}

pub fn create_access_token(
    admin_id: i64,
    email: &str,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    sign(&claims_for(
        admin_id,
        email,
        role,
        Duration::minutes(access_token_expiry_minutes()),
        TOKEN_TYPE_ACCESS,
    ))
}

pub fn create_refresh_token(
    admin_id: i64,
    email: &str,
    role: &str,
) -> Result<(String, chrono::DateTime<Utc>), jsonwebtoken::errors::Error> {
    let claims = claims_for(
        admin_id,
        email,
        role,
        Duration::days(refresh_token_expiry_days()),
        TOKEN_TYPE_REFRESH,
    );
    let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
    Ok((sign(&claims)?, expires_at))
}

fn decode_claims(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Validate an access token. Tokens typed `refresh` are rejected.
pub fn validate_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let claims = decode_claims(token)?;
    if claims.typ != TOKEN_TYPE_ACCESS {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}

/// Validate a refresh token. Only tokens typed `refresh` pass.
pub fn validate_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let claims = decode_claims(token)?;
    if claims.typ != TOKEN_TYPE_REFRESH {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}
