use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use serde_json::{Value, json};

/// Caller identity taken from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthFailure {
    MissingHeader,
    BadEncoding,
    NotBearer,
    InvalidToken(String),
    UnknownRole(u8),
}

impl AuthFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "Missing Authorization header",
            AuthFailure::BadEncoding => "Invalid Authorization header encoding",
            AuthFailure::NotBearer => "Authorization header must start with Bearer",
            AuthFailure::InvalidToken(_) => "Invalid or expired token",
            AuthFailure::UnknownRole(_) => "Invalid role",
        }
    }

    pub fn body(&self) -> Value {
        match self {
            AuthFailure::InvalidToken(details) => {
                json!({"error": self.reason(), "details": details})
            }
            _ => json!({"error": self.reason()}),
        }
    }
}

/// Resolves the `Authorization` header into a caller.
pub fn authenticate(header: Option<&HeaderValue>, secret: &str) -> Result<AuthUser, AuthFailure> {
    let value = header
        .ok_or(AuthFailure::MissingHeader)?
        .to_str()
        .map_err(|_| AuthFailure::BadEncoding)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::NotBearer)?;

    let claims = verify_token(token, secret).map_err(AuthFailure::InvalidToken)?;
    let role = Role::from_id(claims.role).ok_or(AuthFailure::UnknownRole(claims.role))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware when the route sits behind it
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let Some(config) = req.app_data::<Data<Config>>() else {
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Config missing",
            )));
        };

        ready(
            authenticate(req.headers().get(AUTHORIZATION), &config.jwt_secret)
                .map_err(|failure| ErrorUnauthorized(failure.reason())),
        )
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if self.role.manages_attendance() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }
}
