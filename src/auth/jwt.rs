use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::models::Claims;

/// Verifies an HS256 access token from the auth provider and returns its
/// claims. Expiry and audience are always checked.
pub fn verify_token(token: &str, secret: &str, audience: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
