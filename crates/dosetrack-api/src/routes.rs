use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::require_auth;
use crate::resources::{consumptions, drugs, experiences, friends, methods};
use crate::state::AppState;
use crate::{auth, emergency, profile};

/// Every route of the service. Transport layers (CORS, tracing) are added
/// by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/me", get(profile::get_profile).put(profile::update_profile))
        .route("/drugs", get(drugs::list_drugs).post(drugs::create_drug))
        .route("/drugs/favorites", get(drugs::favorite_drugs))
        .route(
            "/drugs/{id}",
            get(drugs::get_drug).put(drugs::update_drug).delete(drugs::delete_drug),
        )
        .route("/methods", get(methods::list_methods).post(methods::create_method))
        .route(
            "/methods/{id}",
            get(methods::get_method)
                .put(methods::update_method)
                .delete(methods::delete_method),
        )
        .route(
            "/experiences",
            get(experiences::list_experiences).post(experiences::create_experience),
        )
        .route(
            "/experiences/{id}",
            get(experiences::get_experience)
                .put(experiences::update_experience)
                .delete(experiences::delete_experience),
        )
        .route(
            "/consumptions",
            get(consumptions::list_consumptions).post(consumptions::create_consumption),
        )
        .route("/consumptions/locations", get(consumptions::locations))
        .route("/consumptions/recent", get(consumptions::recent_consumptions))
        .route(
            "/consumptions/{id}",
            get(consumptions::get_consumption)
                .put(consumptions::update_consumption)
                .delete(consumptions::delete_consumption),
        )
        .route(
            "/consumptions/{id}/friends",
            get(friends::list_friends).post(friends::create_friend),
        )
        .route(
            "/friends/{id}",
            put(friends::update_friend).delete(friends::delete_friend),
        )
        .route("/emergency", post(emergency::notify_contacts))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
