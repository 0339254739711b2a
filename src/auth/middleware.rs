use crate::auth::auth::authenticate;
use crate::config::Config;
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

/// Rejects requests without a valid access token and stores the caller as an
/// `AuthUser` request extension for the handlers.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    match authenticate(req.headers().get(AUTHORIZATION), &config.jwt_secret) {
        Ok(user) => {
            debug!(user_id = user.user_id, path = %req.path(), "Authenticated request");
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(failure) => {
            debug!(reason = failure.reason(), path = %req.path(), "Unauthenticated request");
            let resp = HttpResponse::Unauthorized().json(failure.body());
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}
