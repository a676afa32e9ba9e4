//! API routes

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::context::{device_middleware, AppState};
use crate::handlers::{campaigns, customers, groups, health, short_urls, templates};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Customer routes
    let customer_routes = Router::new()
        .route("/", get(customers::list_customers))
        .route("/", post(customers::create_customer))
        .route("/import", post(customers::import_customers))
        .route("/validate", post(customers::validate_pending_customers))
        .route("/:id", get(customers::get_customer))
        .route("/:id", put(customers::update_customer))
        .route("/:id", delete(customers::delete_customer))
        .route("/:id/validate", post(customers::validate_customer));

    // Group routes
    let group_routes = Router::new()
        .route("/", get(groups::list_groups))
        .route("/", post(groups::create_group))
        .route("/:id", get(groups::get_group))
        .route("/:id", put(groups::update_group))
        .route("/:id", delete(groups::delete_group))
        .route("/:id/members", post(groups::add_group_members))
        .route(
            "/:id/members/:customer_id",
            delete(groups::remove_group_member),
        );

    // Template routes
    let template_routes = Router::new()
        .route("/", get(templates::list_templates))
        .route("/", post(templates::create_template))
        .route("/preview", post(templates::preview_template))
        .route("/:id", get(templates::get_template))
        .route("/:id", put(templates::update_template))
        .route("/:id", delete(templates::delete_template));

    // Campaign routes
    let campaign_routes = Router::new()
        .route("/", get(campaigns::list_campaigns))
        .route("/", post(campaigns::create_campaign))
        .route("/:id", get(campaigns::get_campaign))
        .route("/:id", put(campaigns::update_campaign))
        .route("/:id", delete(campaigns::delete_campaign))
        .route("/:id/start", post(campaigns::start_campaign))
        .route("/:id/pause", post(campaigns::pause_campaign))
        .route("/:id/stats", get(campaigns::get_campaign_stats));

    // Campaign API, scoped to the tenant device
    let campaign_api = Router::new()
        .nest("/customers", customer_routes)
        .nest("/groups", group_routes)
        .nest("/templates", template_routes)
        .nest("/campaigns", campaign_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            device_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/s/:code", get(short_urls::redirect))
        .nest("/campaign", campaign_api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
