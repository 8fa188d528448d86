use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Access tokens authorize API calls; refresh tokens only mint new pairs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

impl Claims {
    /// Owner of the token, if it is of the expected kind.
    pub fn user_for(&self, kind: TokenKind) -> Result<Uuid, AppError> {
        if self.kind == kind {
            return Ok(self.sub);
        }
        Err(AppError::Unauthorized(match kind {
            TokenKind::Access => "Access token required".into(),
            TokenKind::Refresh => "Refresh token required".into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(kind: TokenKind) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            iat: 0,
            exp: 60,
            iss: "iss".into(),
            aud: "aud".into(),
            kind,
        }
    }

    #[test]
    fn kind_mismatch_is_unauthorized() {
        let refresh = claims(TokenKind::Refresh);
        assert_eq!(refresh.user_for(TokenKind::Refresh).unwrap(), refresh.sub);
        assert!(matches!(
            refresh.user_for(TokenKind::Access),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_value(claims(TokenKind::Access)).unwrap();
        assert_eq!(json["kind"], "access");
    }
}
