use crate::auth::jwt::test_token_for;
use crate::config::Config;
use crate::model::holiday::HolidayCalendar;
use crate::models::TokenType;
use chrono::NaiveDate;

pub fn config() -> Config {
    Config::for_tests()
}

fn header_for(user_id: u64, role: u8) -> (&'static str, String) {
    let token = test_token_for(&config().jwt_secret, user_id, role, TokenType::Access);
    ("Authorization", format!("Bearer {token}"))
}

/// Employee caller
pub fn bearer() -> (&'static str, String) {
    header_for(7, 3)
}

/// A second employee
pub fn colleague_bearer() -> (&'static str, String) {
    header_for(8, 3)
}

/// HR caller
pub fn hr_bearer() -> (&'static str, String) {
    header_for(2, 2)
}

pub fn june_holidays() -> HolidayCalendar {
    let mut calendar = HolidayCalendar::new();
    calendar.insert(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(), "Founders Day");
    calendar
}

/// Builds the API behind the auth middleware with a fixed holiday calendar.
macro_rules! test_app {
    ($calendar:expr) => {{
        let holidays: std::sync::Arc<dyn $crate::utils::holiday_client::HolidaySource> = std::sync::Arc::new(
            $crate::utils::holiday_client::StaticHolidaySource::new($calendar),
        );
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($crate::test_support::config()))
                .app_data(actix_web::web::Data::from(holidays))
                .app_data(actix_web::web::Data::new(
                    $crate::utils::form_sessions::FormSessionStore::new(
                        100,
                        std::time::Duration::from_secs(60),
                    ),
                ))
                .service(
                    actix_web::web::scope("/api/v1")
                        .wrap(actix_web::middleware::from_fn(
                            $crate::auth::middleware::auth_middleware,
                        ))
                        .configure($crate::routes::api_services),
                ),
        )
        .await
    }};
}

pub(crate) use test_app;
