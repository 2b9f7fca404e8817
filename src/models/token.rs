use serde::{Deserialize, Serialize};

/// Claims carried inside a signed session token.
///
/// `sub`, `sid` and `vyf` are only present once the session has been
/// verified; a pre-verification token proves nothing beyond "this email asked
/// for a code".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub email: String,
    /// Verified-at marker (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vyf: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}
