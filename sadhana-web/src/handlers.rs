//! API handlers
//!
//! Thin glue: each handler resolves the records involved, asks the engine
//! for a decision, and shapes the response. No authorization rules are
//! encoded here.

use crate::actor::{AdminUser, CurrentUser};
use crate::capability::Capabilities;
use crate::guards::GuardRejection;
use crate::state::{AppState, SadhanaRecord};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use sadhana_access::{Role, UserDataScope, Visibility};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn not_found(resource: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "NotFound", "message": format!("{} not found", resource) })),
    )
        .into_response()
}

/// List all users. Admin only; admins see records unsanitized.
pub async fn list_users(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> Json<Value> {
    let users = state.users.read().await;
    let records: Vec<Value> = users
        .values()
        .map(|record| state.engine.sanitize_user_data(record, admin.role, false))
        .collect();
    Json(json!({ "users": records }))
}

#[derive(Deserialize)]
pub struct ViewParams {
    /// Privacy class being requested; defaults to basic
    pub scope: Option<UserDataScope>,
}

/// Fetch one user, sanitized for the viewer
pub async fn get_user(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ViewParams>,
) -> Result<Json<Value>, Response> {
    let scope = params.scope.unwrap_or(UserDataScope::Basic);

    if !state
        .engine
        .can_view_user_data(user.role, &user.id, &id, scope)
    {
        return Err(GuardRejection::forbidden("Cannot view this user's data").into_response());
    }

    let users = state.users.read().await;
    let record = users.get(&id).ok_or_else(|| not_found("user"))?;

    let is_own = user.id == id;
    Ok(Json(
        state.engine.sanitize_user_data(record, user.role, is_own),
    ))
}

#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// Update profile fields. The ownership guard has already ensured the
/// actor owns the path id or is an admin.
pub async fn update_profile(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Value>, Response> {
    let mut users = state.users.write().await;
    let record = users.get_mut(&id).ok_or_else(|| not_found("user"))?;

    if let Some(fields) = record.as_object_mut() {
        if let Some(display_name) = update.display_name {
            fields.insert("display_name".to_string(), Value::String(display_name));
        }
        if let Some(bio) = update.bio {
            fields.insert("bio".to_string(), Value::String(bio));
        }
    }

    let is_own = user.id == id;
    Ok(Json(
        state.engine.sanitize_user_data(record, user.role, is_own),
    ))
}

#[derive(Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

/// Change a user's role. The assignment-rank rule already ran in the
/// pipeline guard; the full check against the target's current role
/// happens here, where the target record is at hand.
pub async fn change_role(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(change): Json<RoleChange>,
) -> Result<Json<Value>, Response> {
    let mut users = state.users.write().await;
    let record = users.get_mut(&id).ok_or_else(|| not_found("user"))?;

    let current_role = record
        .get("role")
        .and_then(|r| serde_json::from_value::<Role>(r.clone()).ok())
        .unwrap_or(Role::User);

    state
        .engine
        .validate_role_change(user.role, current_role, change.role)
        .map_err(|e| GuardRejection::from(e).into_response())?;

    if let Some(fields) = record.as_object_mut() {
        fields.insert("role".to_string(), json!(change.role));
    }

    info!(target_id = %id, new_role = %change.role, changed_by = %user.id, "role changed");
    Ok(Json(json!({ "id": id, "role": change.role })))
}

/// Roles the actor may grant to others
pub async fn assignable_roles(user: CurrentUser, State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "roles": state.registry.assignable_roles_for(user.role),
    }))
}

/// List practice records the actor may see, per the engine's data filter
pub async fn list_sadhanas(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Json<Value> {
    let filter = state.engine.data_access_filter(Some(user.role), &user.id);

    let sadhanas = state.sadhanas.read().await;
    let mut visible: Vec<&SadhanaRecord> = sadhanas
        .values()
        .filter(|record| filter.permits(&record.owner_id, record.visibility))
        .collect();
    visible.sort_by(|a, b| a.id.cmp(&b.id));

    Json(json!({ "sadhanas": visible, "filter": filter }))
}

#[derive(Deserialize)]
pub struct NewSadhana {
    pub owner_id: String,
    pub title: String,
    pub visibility: Option<Visibility>,
}

/// Create a practice record. The ownership guard has already checked the
/// claimed owner; the capability object answers the create check.
pub async fn create_sadhana(
    State(state): State<AppState>,
    Extension(caps): Extension<Capabilities>,
    Json(new): Json<NewSadhana>,
) -> Result<(StatusCode, Json<Value>), Response> {
    if !caps.can_create("sadhana") {
        return Err(GuardRejection::forbidden("Cannot create practice records").into_response());
    }

    let record = SadhanaRecord {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: new.owner_id,
        title: new.title,
        visibility: new.visibility.unwrap_or(Visibility::Private),
    };

    let mut sadhanas = state.sadhanas.write().await;
    sadhanas.insert(record.id.clone(), record.clone());

    Ok((StatusCode::CREATED, Json(json!(record))))
}

/// Fetch one practice record through the resource policy
pub async fn get_sadhana(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Response> {
    let sadhanas = state.sadhanas.read().await;
    let record = sadhanas.get(&id).ok_or_else(|| not_found("sadhana"))?;

    if !state.engine.can_access_resource(
        Some(user.role),
        "sadhana",
        "read",
        Some(&record.owner_id),
        Some(&user.id),
    ) {
        return Err(GuardRejection::forbidden("Cannot read this practice record").into_response());
    }

    Ok(Json(json!(record)))
}

/// Delete a practice record through the resource policy
pub async fn delete_sadhana(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Response> {
    let mut sadhanas = state.sadhanas.write().await;
    let record = sadhanas.get(&id).ok_or_else(|| not_found("sadhana"))?;

    if !state.engine.can_access_resource(
        Some(user.role),
        "sadhana",
        "delete",
        Some(&record.owner_id),
        Some(&user.id),
    ) {
        return Err(
            GuardRejection::forbidden("Cannot delete this practice record").into_response(),
        );
    }

    sadhanas.remove(&id);
    Ok(StatusCode::OK)
}

/// Actions the actor could take on one practice record
pub async fn sadhana_actions(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Response> {
    let sadhanas = state.sadhanas.read().await;
    let record = sadhanas.get(&id).ok_or_else(|| not_found("sadhana"))?;

    let actions = state.engine.available_actions(
        Some(user.role),
        "sadhana",
        Some(&record.owner_id),
        Some(&user.id),
    );
    Ok(Json(json!({ "id": id, "actions": actions })))
}

/// The declarative filter a data layer would apply for this actor
pub async fn feed_filter(user: CurrentUser, State(state): State<AppState>) -> Json<Value> {
    let filter = state.engine.data_access_filter(Some(user.role), &user.id);
    Json(json!({ "filter": filter }))
}

/// The actor's capability summary, for conditional rendering upstream
pub async fn my_capabilities(
    user: CurrentUser,
    Extension(caps): Extension<Capabilities>,
) -> Json<Value> {
    let mut resources = serde_json::Map::new();
    for resource in ["user", "profile", "sadhana", "book", "community"] {
        resources.insert(
            resource.to_string(),
            json!({
                "create": caps.can_create(resource),
                "read": caps.can_read(resource),
                "update": caps.can_update(resource),
                "delete": caps.can_delete(resource),
            }),
        );
    }

    Json(json!({
        "user_id": user.id,
        "role": user.role,
        "is_admin": caps.is_admin(),
        "is_super_admin": caps.is_super_admin(),
        "resources": resources,
    }))
}
