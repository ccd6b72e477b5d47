//! Admin REST API handlers: token issuance, user CRUD, generic model CRUD.

use crate::auth::principal::{prepare_user_write, PrincipalStore};
use crate::auth::Permission;
use crate::error::AppError;
use crate::extract::AdminToken;
use crate::model::schema::schema_for;
use crate::service::{ensure_known_attributes, ensure_required_for_create, CrudService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Issue an access token for an admin user. Bad username, non-admin user and
/// bad password are indistinguishable to the caller.
pub async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = PrincipalStore::by_username(&state.pool, &form.username)
        .await?
        .filter(|u| u.is_admin)
        .filter(|u| u.verify_password(&form.password))
        .ok_or_else(|| AppError::BadRequest("username or password invalid".into()))?;
    let token = state.tokens.issue(user.id, None)?;
    Ok((
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(TokenResponse {
            access_token: token,
            expires_in: state.tokens.default_expiration(),
        }),
    ))
}

/// Schema descriptor for one registered model.
pub async fn model_schema(
    State(state): State<AppState>,
    AdminToken(_): AdminToken,
    Path(model): Path<String>,
) -> Result<Json<Value>, AppError> {
    let spec = state.registry.get(&model)?;
    Ok(Json(schema_for(spec)))
}

pub async fn read_model(
    State(state): State<AppState>,
    AdminToken(_): AdminToken,
    Path((model, id)): Path<(String, i64)>,
) -> Result<Json<Value>, AppError> {
    let spec = state.registry.get(&model)?;
    let row = CrudService::read_with_relations(&state.pool, &state.registry, spec, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", spec.name, id)))?;
    Ok(Json(row))
}

pub async fn update_model(
    State(state): State<AppState>,
    AdminToken(_): AdminToken,
    Path((model, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let spec = state.registry.get(&model)?;
    let mut body = body_to_map(body)?;
    if spec.name == "user" {
        body = prepare_user_write(body)?;
    }
    // all keys checked before any write; one unknown attribute fails the
    // whole request and the row stays untouched
    ensure_known_attributes(spec, &body)?;
    let row = CrudService::update(&state.pool, spec, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", spec.name, id)))?;
    Ok(Json(row))
}

pub async fn delete_model(
    State(state): State<AppState>,
    AdminToken(_): AdminToken,
    Path((model, id)): Path<(String, i64)>,
) -> Result<StatusCode, AppError> {
    let spec = state.registry.get(&model)?;
    if !CrudService::delete(&state.pool, spec, id).await? {
        return Err(AppError::NotFound(format!("{} {}", spec.name, id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_model(
    State(state): State<AppState>,
    AdminToken(_): AdminToken,
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let spec = state.registry.get(&model)?;
    let mut body = body_to_map(body)?;
    if spec.name == "user" {
        body = prepare_user_default_permissions(&state, body)?;
    }
    ensure_known_attributes(spec, &body)?;
    ensure_required_for_create(spec, &body)?;
    let row = CrudService::create(&state.pool, spec, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// User create bodies get password hashing plus, when no explicit permission
/// list is supplied, a seeded read tag per registered model.
fn prepare_user_default_permissions(
    state: &AppState,
    body: HashMap<String, Value>,
) -> Result<HashMap<String, Value>, AppError> {
    if !body.contains_key("password") {
        return Err(AppError::BadRequest("password is required".into()));
    }
    let mut body = prepare_user_write(body)?;
    if !body.contains_key("permissions") {
        let seeded: Vec<String> = state
            .registry
            .specs()
            .filter_map(|spec| {
                Permission::new(&spec.table, "read", &state.registry)
                    .ok()
                    .map(|p| p.as_str().to_string())
            })
            .collect();
        body.insert("permissions".to_string(), serde_json::json!(seeded));
    }
    Ok(body)
}

// The /user routes reuse the generic handlers with the model pinned, so the
// user-specific body handling stays in one place.

pub async fn read_user(
    state: State<AppState>,
    token: AdminToken,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    read_model(state, token, Path(("user".to_string(), id))).await
}

pub async fn update_user(
    state: State<AppState>,
    token: AdminToken,
    Path(id): Path<i64>,
    body: Json<Value>,
) -> Result<Json<Value>, AppError> {
    update_model(state, token, Path(("user".to_string(), id)), body).await
}

pub async fn delete_user(
    state: State<AppState>,
    token: AdminToken,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    delete_model(state, token, Path(("user".to_string(), id))).await
}

pub async fn create_user(
    state: State<AppState>,
    token: AdminToken,
    body: Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    create_model(state, token, Path("user".to_string()), body).await
}
