use serde::{Deserialize, Serialize};

/// Access token claims as issued by the hosted auth provider. `sub` is the
/// user's UUID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}
