use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct MagicLinkReq {
    #[schema(example = "lead@brink.eu")]
    pub email: String,
    /// Page to return to after sign-in, echoed back on verification
    #[schema(example = "/manager")]
    pub redirect_to: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct VerifyQuery {
    /// One-time token from the emailed link
    pub token: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub access_token: String,
    pub email: String,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Signed-in email
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    /// Session id; sign-out and manager unlocks are keyed by it
    pub jti: String,
}
