use crate::{
    api::{admin, admin_users, manager, overlay, public, realtime},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(60_000 / requests_per_min as u64)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap_or_default();
        Governor::new(&cfg)
    }

    let public_limiter = Arc::new(build_limiter(config.rate_public_per_min));
    let magic_link_limiter = Arc::new(build_limiter(config.rate_magic_link_per_min));
    let unlock_limiter = Arc::new(build_limiter(config.rate_unlock_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(
        web::resource("/health")
            .wrap(public_limiter.clone())
            .route(web::get().to(public::health)),
    );

    // Change notifications; a stream stays open, so only the connect is limited
    cfg.service(
        web::resource("/realtime")
            .wrap(public_limiter.clone())
            .route(web::get().to(realtime::subscribe)),
    );

    // Public submission page
    cfg.service(
        web::scope("/public")
            .wrap(public_limiter.clone())
            .service(web::resource("/departments").route(web::get().to(public::list_departments)))
            .service(web::resource("/employees").route(web::get().to(public::list_employees)))
            .service(
                web::resource("/leave-requests")
                    .route(web::get().to(public::recent_requests))
                    .route(web::post().to(public::submit_request)),
            ),
    );

    // Sign-in
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/magic-link")
                    .wrap(magic_link_limiter.clone())
                    .route(web::post().to(handlers::request_magic_link)),
            )
            .service(
                web::resource("/verify")
                    .wrap(magic_link_limiter)
                    .route(web::get().to(handlers::verify_magic_link)),
            )
            .service(
                web::resource("/logout")
                    .wrap(public_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Session routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::me)
            .service(
                web::scope("/manager")
                    // /manager/unlock
                    .service(
                        web::resource("/unlock")
                            .wrap(unlock_limiter)
                            .route(web::post().to(manager::unlock)),
                    )
                    // /manager/requests
                    .service(
                        web::resource("/requests").route(web::get().to(manager::list_requests)),
                    )
                    // /manager/requests/{id}/approve
                    .service(
                        web::resource("/requests/{id}/approve")
                            .route(web::put().to(manager::approve)),
                    )
                    // /manager/requests/{id}/reject
                    .service(
                        web::resource("/requests/{id}/reject").route(web::put().to(manager::reject)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .service(web::resource("/me").route(web::get().to(admin::me)))
                    // /admin/departments
                    .service(
                        web::resource("/departments")
                            .route(web::get().to(admin::list_departments))
                            .route(web::post().to(admin::create_department)),
                    )
                    .service(
                        web::resource("/departments/{id}")
                            .route(web::put().to(admin::rename_department))
                            .route(web::delete().to(admin::delete_department)),
                    )
                    // /admin/employees
                    .service(
                        web::resource("/employees")
                            .route(web::get().to(admin::list_employees))
                            .route(web::post().to(admin::create_employee)),
                    )
                    .service(
                        web::resource("/employees/{id}")
                            .route(web::put().to(admin::update_employee))
                            .route(web::delete().to(admin::delete_employee)),
                    )
                    // /admin/managers (generate-pin before {email})
                    .service(
                        web::resource("/managers/generate-pin")
                            .route(web::get().to(admin::generate_manager_pin)),
                    )
                    .service(
                        web::resource("/managers")
                            .route(web::get().to(admin::list_managers))
                            .route(web::post().to(admin::upsert_manager)),
                    )
                    .service(
                        web::resource("/managers/{email}")
                            .route(web::delete().to(admin::delete_manager)),
                    )
                    // /admin/requests (pending-summary before {id})
                    .service(
                        web::resource("/requests/pending-summary")
                            .route(web::get().to(admin::pending_summary)),
                    )
                    .service(
                        web::resource("/requests").route(web::get().to(admin::list_requests)),
                    )
                    .service(
                        web::resource("/requests/{id}/status")
                            .route(web::put().to(admin::set_request_status)),
                    )
                    .service(
                        web::resource("/requests/{id}")
                            .route(web::put().to(admin::update_request))
                            .route(web::delete().to(admin::delete_request)),
                    )
                    // /admin/admin-users
                    .service(
                        web::resource("/admin-users")
                            .route(web::get().to(admin_users::list_admin_users))
                            .route(web::post().to(admin_users::upsert_admin_user)),
                    )
                    .service(
                        web::resource("/admin-users/{email}")
                            .route(web::delete().to(admin_users::delete_admin_user)),
                    ),
            )
            .service(
                web::scope("/overlay").service(
                    web::resource("/affordances").route(web::get().to(overlay::get_affordances)),
                ),
            ),
    );
}

// SIGN-IN
//  ├─ POST /auth/magic-link  → one-time link (15 min)
//  └─ GET  /auth/verify      → access_token (15 min)

// MANAGER
//  └─ POST /api/manager/unlock {pin} → department cached for the session

// SIGN-OUT
//  └─ POST /auth/logout      → session revoked, unlock dropped
