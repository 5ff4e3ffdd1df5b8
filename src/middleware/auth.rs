use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;

use crate::errors::{AppError, Result};
use crate::models::user::{Claims, UserRole};
use crate::state::AppState;

pub const SESSION_TTL_MINUTES: i64 = 60;

/// Claims for a freshly authenticated session: 60-minute validity, no
/// server-side state.
pub fn session_claims(user_id: &ObjectId, mobile: &str, role: UserRole) -> Claims {
    Claims {
        sub: user_id.to_hex(),
        mobile: mobile.to_string(),
        role,
        exp: (Utc::now().timestamp() + SESSION_TTL_MINUTES * 60) as usize,
    }
}

pub fn sign_token(claims: &Claims, secret: &str) -> Result<String> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::service(format!("Token signing failed: {}", e)))
}

/// Signature and expiry are the whole check; there is no revocation list.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = decode_token(token, &state.config.jwt_secret)?;

    // Downstream handlers read the principal from request extensions.
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Gate for admin-only routes; must run after `auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or(AppError::Unauthorized)?;

    if claims.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip() {
        let id = ObjectId::new();
        let claims = session_claims(&id, "+919876543210", UserRole::Citizen);
        let token = sign_token(&claims, SECRET).unwrap();

        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, id.to_hex());
        assert_eq!(decoded.mobile, "+919876543210");
        assert_eq!(decoded.role, UserRole::Citizen);
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: ObjectId::new().to_hex(),
            mobile: "+919876543210".to_string(),
            role: UserRole::Citizen,
            exp: (Utc::now().timestamp() - 120) as usize,
        };
        let token = sign_token(&claims, SECRET).unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AppError::Unauthorized)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = session_claims(&ObjectId::new(), "+919876543210", UserRole::Admin);
        let token = sign_token(&claims, SECRET).unwrap();
        assert!(matches!(decode_token(&token, "other-secret"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn session_expiry_is_sixty_minutes_out() {
        let claims = session_claims(&ObjectId::new(), "+919876543210", UserRole::Citizen);
        let expected = Utc::now().timestamp() + SESSION_TTL_MINUTES * 60;
        let delta = claims.exp as i64 - expected;
        assert!(delta.abs() <= 2, "exp drifted by {}s", delta);
    }
}
