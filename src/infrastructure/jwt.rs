//! Bearer token verification for HS256 JWTs issued by the external auth service.

use crate::domain::identity::{Identity, Role, UserId};
use crate::domain::ports::IdentityProvider;
use crate::error::{Result, ShopError};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Minimum accepted length of the shared signing secret.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// When set, tokens must carry a matching `iss` claim.
    pub issuer: Option<String>,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ShopError::invalid(
                "jwtSecret",
                format!("JWT secret must be at least {MIN_SECRET_LEN} characters long"),
            ));
        }
        Ok(Self {
            secret,
            issuer: None,
        })
    }

    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer;
        self
    }
}

/// Claims read from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl TryFrom<Claims> for Identity {
    type Error = ShopError;

    fn try_from(claims: Claims) -> Result<Self> {
        let role: Role = claims.role.parse()?;
        Ok(Identity {
            user_id: UserId::new(claims.sub),
            role,
            email: claims.email,
        })
    }
}

pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn verify(&self, token: &str) -> Result<Identity> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ShopError::Unauthorized("Token expired".to_string()),
                _ => ShopError::Unauthorized("Invalid authentication token".to_string()),
            }
        })?;
        Identity::try_from(data.claims)
    }
}
