use crate::{
    api::{attendance, health, leave_balance},
    auth::middleware::auth_middleware,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter spreading `requests_per_min` evenly over the minute, with
/// the full minute's allowance as burst. `None` for a zero rate.
pub fn limiter_config(requests_per_min: u32) -> Option<LimiterConfig> {
    if requests_per_min == 0 {
        return None;
    }
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: &LimiterConfig) {
    // Public routes
    cfg.service(health);

    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(limiter))
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::post().to(attendance::log_attendance)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/leave-balance")
                    // /leave-balance
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_balance::get_leave_balance))
                            .route(web::put().to(leave_balance::save_leave_balance)),
                    )
                    // /leave-balance/summary
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(leave_balance::leave_summary)),
                    ),
            ),
    );
}
