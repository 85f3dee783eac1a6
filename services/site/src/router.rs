use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use wrantle_core::health::healthz;
use wrantle_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    contact::{create_contact, delete_contact, get_contact, list_contacts, update_contact},
    health::readyz,
    registration::register,
    user::get_me,
    verification::{request_verification, verify_code},
    writing::{
        create_writing, delete_writing, get_writing, list_drafts, list_writings, update_writing,
    },
};
use crate::infra::rate_limit::{limit_contacts, limit_registrations};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration
        .route(
            "/registrations",
            post(register).route_layer(middleware::from_fn_with_state(
                state.clone(),
                limit_registrations,
            )),
        )
        // Users
        .route("/users/@me", get(get_me))
        // Verification
        .route(
            "/verifications/{verification_type}/request",
            post(request_verification),
        )
        .route(
            "/verifications/{verification_type}/verify",
            post(verify_code),
        )
        // Contacts
        .route(
            "/contacts",
            post(create_contact).route_layer(middleware::from_fn_with_state(
                state.clone(),
                limit_contacts,
            )),
        )
        .route("/contacts", get(list_contacts))
        .route("/contacts/{id}", get(get_contact))
        .route("/contacts/{id}", patch(update_contact))
        .route("/contacts/{id}", delete(delete_contact))
        // Writings
        .route("/writings", get(list_writings))
        .route("/writings", post(create_writing))
        .route("/writings/drafts", get(list_drafts))
        .route("/writings/{slug}", get(get_writing))
        .route("/writings/{slug}", patch(update_writing))
        .route("/writings/{slug}", delete(delete_writing))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
