pub mod error;
pub mod routes;
pub mod state;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware;
use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .cors_origin
                .parse::<axum::http::HeaderValue>()
                .unwrap_or(axum::http::HeaderValue::from_static("*")),
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/ready", get(routes::health::readiness))
        .route("/health/live", get(routes::health::liveness))
        .route(
            "/planning-sessions",
            post(routes::sessions::create_session),
        )
        .route(
            "/planning-sessions/:id",
            get(routes::sessions::get_session),
        )
        .route(
            "/planning-sessions/join/:token",
            post(routes::sessions::join_session),
        )
        .route(
            "/planning-sessions/:id/participants",
            get(routes::sessions::list_participants),
        )
        .route(
            "/planning-sessions/:id/revoke",
            post(routes::sessions::revoke_invite),
        )
        .route(
            "/planning-sessions/:id/finalize",
            post(routes::sessions::finalize_session),
        )
        .route(
            "/planning-sessions/:id/venues",
            get(routes::venues::get_venues).post(routes::venues::add_venue),
        )
        .route(
            "/planning-sessions/:id/venues/ranked",
            get(routes::venues::rank_venues),
        )
        .route(
            "/planning-sessions/:id/venues/:vid/vote",
            post(routes::venues::cast_vote),
        )
        .route(
            "/planning-sessions/:id/itinerary",
            get(routes::itinerary::get_itinerary).post(routes::itinerary::add_to_itinerary),
        )
        .route(
            "/planning-sessions/:id/itinerary/reorder",
            post(routes::itinerary::reorder_itinerary),
        )
        .route(
            "/planning-sessions/:id/itinerary/:item_id",
            axum::routing::delete(routes::itinerary::remove_from_itinerary),
        )
        .route(
            "/planning-sessions/:id/venues/:vid/comments",
            get(routes::comments::get_comments).post(routes::comments::add_comment),
        )
        .route(
            "/planning-sessions/:id/comments",
            get(routes::comments::get_participant_comments),
        )
        .route("/planning-sessions/:id/ws", get(routes::ws::ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(
                    middleware::request_id::request_id_middleware,
                ))
                .layer(axum::middleware::from_fn(
                    middleware::security::security_headers_middleware,
                ))
                .layer(axum::middleware::from_fn(
                    middleware::security::validate_payload_size,
                ))
                .layer(axum::middleware::from_fn(
                    middleware::logging::request_logging_middleware,
                ))
                .layer(cors)
                .into_inner(),
        )
        .with_state(state)
}
