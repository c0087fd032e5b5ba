use super::Claims;

/// Authenticated caller extracted from a verified JWT
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Actor id (JWT `sub`)
    pub user_id: String,

    pub email: Option<String>,

    pub role: Option<String>,

    pub issuer: Option<String>,

    claims: Claims,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = claims.sub.trim();
        if user_id.is_empty() {
            return Err("Missing subject in token");
        }

        Ok(Self {
            user_id: user_id.to_string(),
            email: claims.email.clone(),
            role: claims.role.clone(),
            issuer: claims.iss.clone(),
            claims: claims.clone(),
        })
    }

    /// Actor id stamped on records this caller writes
    pub fn actor(&self) -> Option<&str> {
        Some(self.user_id.as_str())
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
