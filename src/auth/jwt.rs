use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes an access token. Refresh tokens are refused here: they only buy a
/// new access token from the HR backend.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("Refresh token cannot be used for API calls".to_string());
    }
    Ok(claims)
}

#[cfg(test)]
pub fn test_token(secret: &str, role: u8, token_type: TokenType) -> String {
    test_token_for(secret, 7, role, token_type)
}

#[cfg(test)]
pub fn test_token_for(secret: &str, user_id: u64, role: u8, token_type: TokenType) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        user_id,
        sub: "asha".to_string(),
        role,
        exp: now + 900,
        jti: uuid::Uuid::new_v4().to_string(),
        token_type,
        employee_id: Some(1007),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
