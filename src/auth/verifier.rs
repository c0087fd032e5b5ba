//! HS256 token verification

use anyhow::{Context, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::Claims;
use crate::config::Settings;

/// Verifies bearer tokens signed with the shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.jwt_secret,
            settings.jwt_issuer.as_deref(),
            settings.jwt_audience.as_deref(),
        )
    }

    /// Verify a JWT and return its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .context("JWT validation failed")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp_offset: i64) -> Claims {
        Claims {
            sub: "admin-1".into(),
            exp: Utc::now().timestamp() + exp_offset,
            iat: Some(Utc::now().timestamp()),
            nbf: None,
            iss: Some("realty".into()),
            aud: None,
            email: Some("admin@example.com".into()),
            role: Some("admin".into()),
        }
    }

    #[test]
    fn accepts_tokens_signed_with_the_secret() {
        let verifier = TokenVerifier::new("s3cret", Some("realty"), None);
        let verified = verifier.verify_token(&mint("s3cret", &claims(600))).unwrap();
        assert_eq!(verified.sub, "admin-1");
    }

    #[test]
    fn rejects_bad_signature_expiry_and_issuer() {
        let verifier = TokenVerifier::new("s3cret", Some("realty"), None);
        assert!(verifier.verify_token(&mint("other", &claims(600))).is_err());
        assert!(verifier.verify_token(&mint("s3cret", &claims(-600))).is_err());

        let strict = TokenVerifier::new("s3cret", Some("someone-else"), None);
        assert!(strict.verify_token(&mint("s3cret", &claims(600))).is_err());
        assert!(verifier.verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn audience_is_checked_when_configured() {
        let verifier = TokenVerifier::new("s3cret", None, Some("admin-panel"));
        let mut c = claims(600);
        assert!(verifier.verify_token(&mint("s3cret", &c)).is_err());
        c.aud = Some("admin-panel".into());
        assert!(verifier.verify_token(&mint("s3cret", &c)).is_ok());
    }
}
