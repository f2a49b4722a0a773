use std::sync::Arc;

use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{Error, middleware::from_fn, web};
use anyhow::{Result, anyhow};

use crate::{
    api::{attendance, employee, payroll},
    auth::{handlers, middleware::session_middleware},
    config::Config,
    error::PayrollError,
};

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters for the public auth routes and the protected API.
#[derive(Clone)]
pub struct RateLimits {
    login: Limiter,
    protected: Limiter,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: build_limiter(config.rate_login_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))?;

    Ok(Arc::new(Governor::new(&cfg)))
}

/// Extractor failures answer with the same JSON body as handler errors.
fn bad_request(err: impl std::fmt::Display) -> Error {
    PayrollError::InvalidInput(err.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limits: &RateLimits) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_request(err)));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limits.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limits.login.clone())
                    .route(web::post().to(handlers::logout)),
            )
            .service(web::resource("/verify").route(web::get().to(handlers::verify))),
    );

    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(session_middleware))
            .wrap(limits.protected.clone())
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(web::resource("").route(web::get().to(payroll::list_payroll)))
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payroll::generate_payroll)),
                    )
                    // summaries before /{id}
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(payroll::payroll_summary_all)),
                    )
                    .service(
                        web::resource("/summary/{month}/{year}")
                            .route(web::get().to(payroll::payroll_summary)),
                    )
                    // /payroll/{id}
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll)))
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(payroll::update_payroll_status)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/stats/dashboard")
                            .route(web::get().to(employee::dashboard_stats)),
                    )
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee)),
                    ),
            )
            .service(
                web::scope("/attendance").service(
                    web::resource("")
                        .route(web::post().to(attendance::record_attendance))
                        .route(web::get().to(attendance::list_attendance)),
                ),
            ),
    );
}
