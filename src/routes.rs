use crate::{
    api::{attendance, leave_calculation, leave_form, short_leave},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Limiter shared by every protected route
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Protected routes, relative to the api prefix.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            // /leave/calculate
            .service(
                web::resource("/calculate")
                    .route(web::post().to(leave_calculation::calculate_leave)),
            )
            // /leave/forms
            .service(web::resource("/forms").route(web::post().to(leave_form::open_form)))
            // /leave/forms/{id}
            .service(
                web::resource("/forms/{id}")
                    .route(web::get().to(leave_form::get_form))
                    .route(web::delete().to(leave_form::close_form)),
            )
            .service(
                web::resource("/forms/{id}/dates").route(web::put().to(leave_form::select_dates)),
            )
            .service(
                web::resource("/forms/{id}/portion")
                    .route(web::put().to(leave_form::select_portion)),
            ),
    )
    .service(
        web::scope("/short-leave").service(
            web::resource("/duration").route(web::post().to(short_leave::short_leave_duration)),
        ),
    )
    .service(
        web::scope("/attendance")
            .service(
                web::resource("/regularization/duration")
                    .route(web::post().to(attendance::regularization)),
            )
            .service(web::resource("/bulk/preview").route(web::post().to(attendance::bulk_preview)))
            .service(web::resource("/el-credit").route(web::post().to(attendance::el_credit))),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .configure(api_services),
    );
}
