//! Route definitions
//!
//! Wires handlers to guards. Guard layers run closest to the handler;
//! actor resolution, capability attachment and the disabled-account guard
//! are applied router-wide in `create_app`.

use crate::audit::audit_hook;
use crate::guards::{access_guard, ownership_guard, role_assignment_guard, OwnerRef, Requirement};
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use sadhana_access::Permission;

/// Build the `/api` router
pub fn api_routes(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(
            "/users",
            get(handlers::list_users).layer(from_fn_with_state(
                (
                    state.clone(),
                    Requirement::all_permissions(&[Permission::UserList]),
                ),
                access_guard,
            )),
        )
        .route("/users/{id}", get(handlers::get_user))
        .route(
            "/users/{id}/profile",
            put(handlers::update_profile).layer(from_fn_with_state(
                (state.clone(), OwnerRef::PathParam("id")),
                ownership_guard,
            )),
        )
        .route(
            "/users/{id}/role",
            put(handlers::change_role).layer(from_fn_with_state(
                state.clone(),
                role_assignment_guard,
            )),
        )
        .layer(from_fn_with_state((state.clone(), "user"), audit_hook));

    let sadhana_routes = Router::new()
        .route("/sadhanas", get(handlers::list_sadhanas))
        .route(
            "/sadhanas",
            post(handlers::create_sadhana).layer(from_fn_with_state(
                (state.clone(), OwnerRef::BodyField("owner_id")),
                ownership_guard,
            )),
        )
        .route(
            "/sadhanas/{id}",
            get(handlers::get_sadhana).delete(handlers::delete_sadhana),
        )
        .route("/sadhanas/{id}/actions", get(handlers::sadhana_actions))
        .layer(from_fn_with_state((state.clone(), "sadhana"), audit_hook));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/roles/assignable", get(handlers::assignable_roles))
        .route("/feed/filter", get(handlers::feed_filter))
        .route("/me/capabilities", get(handlers::my_capabilities))
        .merge(user_routes)
        .merge(sadhana_routes)
        .with_state(state)
}
