use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

use crate::{
    api::{employee, leave, stats},
    auth::handlers,
    config::Config,
};

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/employee/login")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::employee_login)),
            )
            .service(
                web::resource("/hr/login")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::hr_login)),
            ),
    );

    // Protected routes: token checks happen in the AuthUser extractor,
    // role checks per handler.
    cfg.service(
        web::scope("/employees")
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            .service(
                web::resource("/{id}/balance").route(web::get().to(employee::get_balance)),
            ),
    );

    cfg.service(
        web::scope("/leaves")
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(web::resource("").route(web::get().to(leave::list_leaves)))
            .service(
                web::resource("/{id}/approve").route(web::post().to(leave::approve_leave)),
            )
            .service(web::resource("/{id}/reject").route(web::post().to(leave::reject_leave))),
    );

    cfg.service(
        web::scope("/employee")
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(
                web::resource("/leaves")
                    .route(web::post().to(leave::apply_leave))
                    .route(web::get().to(leave::my_leaves)),
            )
            .service(web::resource("/balance").route(web::get().to(employee::my_balance))),
    );

    cfg.service(
        web::resource("/stats")
            .wrap(build_limiter(config.rate_protected_per_min))
            .route(web::get().to(stats::get_stats)),
    );
}
