use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short-lived access token or long-lived refresh token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Payload of every token we sign.
///
/// `sub` is the stable user id rather than the email, so tokens issued
/// before an email change keep resolving to the same account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub kind: TokenKind,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}
