pub mod auth_handlers;
pub mod collaboration_handlers;
pub mod proposal_handlers;

use actix_web::web;

/// The full `/api` route table, shared by the server binary and the
/// handler-level tests.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public: account provisioning and sign-in
            .route("/auth/register", web::post().to(auth_handlers::register))
            .route("/auth/login", web::post().to(auth_handlers::login))
            // Proposals. Every handler resolves the bearer identity
            .route("/proposals", web::post().to(proposal_handlers::create))
            .route("/proposals", web::get().to(proposal_handlers::list))
            .route("/proposals/{id}", web::get().to(proposal_handlers::detail))
            .route("/proposals/{id}/status", web::patch().to(proposal_handlers::update_status))
            .route("/proposals/{id}/assign", web::patch().to(proposal_handlers::assign))
            .route("/proposals/{id}/feedback", web::post().to(proposal_handlers::feedback))
            .route("/proposals/{id}/progress", web::patch().to(proposal_handlers::progress))
            // Collaboration invitations
            .route("/collaboration/invite", web::post().to(collaboration_handlers::invite))
            .route(
                "/collaboration/invitations/{proposal_id}",
                web::get().to(collaboration_handlers::invitations),
            ),
    );
}
