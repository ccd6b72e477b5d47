//! Admin UI handlers: login/logout, dashboard, per-model listing and forms.
//!
//! Pages are plain HTML strings with escaped values; no template engine.

use crate::auth::principal::{prepare_user_write, PrincipalStore};
use crate::auth::session::{clear_session_cookie, cookie_value, session_cookie, SessionData, SESSION_COOKIE};
use crate::error::AppError;
use crate::extract::AdminSession;
use crate::model::spec::{ColumnSpec, ColumnType, ModelSpec};
use crate::service::{ensure_known_attributes, ensure_required_for_create, CrudService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect},
    Form,
};
use html_escape::encode_text;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html><head><title>{} - curator</title></head>\n<body>\n{}\n</body></html>",
        encode_text(title),
        body
    ))
}

/// Dashboard: the registered models, linked to their listings.
pub async fn index(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> Html<String> {
    let mut items = String::new();
    for spec in state.registry.specs() {
        let name = spec.name.to_lowercase();
        items.push_str(&format!(
            "<li><a href=\"{}/{}\">{}</a></li>\n",
            state.admin_prefix,
            encode_text(&name),
            encode_text(&spec.name)
        ));
    }
    let body = format!(
        "<h1>Admin</h1>\n<p>Signed in as {}. <a href=\"{}/logout\">Logout</a></p>\n<ul>\n{}</ul>",
        encode_text(&session.username),
        state.admin_prefix,
        items
    );
    page("admin", &body)
}

#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub error: Option<String>,
}

fn login_page(prefix: &str, error: Option<&str>) -> Html<String> {
    let flash = match error {
        Some(msg) => format!("<p class=\"error\">{}</p>\n", encode_text(msg)),
        None => String::new(),
    };
    let body = format!(
        "<h1>Login</h1>\n{}<form method=\"post\" action=\"{}/login\">\n\
         <label>Username <input name=\"username\"></label>\n\
         <label>Password <input name=\"password\" type=\"password\"></label>\n\
         <button type=\"submit\">Login</button>\n</form>",
        flash, prefix
    );
    page("login", &body)
}

pub async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    login_page(&state.admin_prefix, query.error.as_deref())
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Validate credentials and open a session. Failures re-render the form with
/// a message; success sets the session cookie and redirects to the dashboard.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginRequest>,
) -> Result<axum::response::Response, AppError> {
    let prefix = state.admin_prefix.to_string();
    let Some(user) = PrincipalStore::by_username(&state.pool, &form.username).await? else {
        return Ok(login_page(&prefix, Some("User not found.")).into_response());
    };
    if !user.is_admin {
        return Ok(login_page(&prefix, Some("User not administrative.")).into_response());
    }
    if !user.verify_password(&form.password) {
        return Ok(login_page(&prefix, Some("Wrong password.")).into_response());
    }
    let id = state.sessions.create(SessionData {
        user_id: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
    });
    tracing::info!(user = %user.username, "admin login");
    Ok((
        [(header::SET_COOKIE, session_cookie(&id))],
        Redirect::to(&format!("{}/", prefix)),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(id) = cookie_value(&headers, SESSION_COOKIE) {
        state.sessions.remove(&id);
    }
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to(&format!("{}/login", state.admin_prefix)),
    )
}

fn ui_not_found() -> AppError {
    AppError::NotFound("Data model not defined or registered.".into())
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Table listing with edit links.
pub async fn model_list(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(model): Path<String>,
) -> Result<Html<String>, AppError> {
    let spec = state.registry.get(&model).map_err(|_| ui_not_found())?;
    let rows = CrudService::list(&state.pool, spec, None, None).await?;
    let prefix = &state.admin_prefix;
    let model_path = spec.name.to_lowercase();

    let mut head = String::new();
    for col in &spec.columns {
        if col.sensitive {
            continue;
        }
        head.push_str(&format!("<th>{}</th>", encode_text(&col.name)));
    }
    let mut body_rows = String::new();
    for row in &rows {
        let mut cells = String::new();
        for col in &spec.columns {
            if col.sensitive {
                continue;
            }
            let v = row.get(&col.name).cloned().unwrap_or(Value::Null);
            cells.push_str(&format!("<td>{}</td>", encode_text(&cell_text(&v))));
        }
        let id = row.get("id").and_then(Value::as_i64).unwrap_or_default();
        body_rows.push_str(&format!(
            "<tr>{}<td><a href=\"{}/{}/{}/edit\">edit</a></td></tr>\n",
            cells, prefix, model_path, id
        ));
    }
    let body = format!(
        "<h1>{}</h1>\n<p><a href=\"{}/\">Back</a> | <a href=\"{}/{}/add\">Add</a></p>\n\
         <table>\n<tr>{}<th></th></tr>\n{}</table>",
        encode_text(&spec.name),
        prefix,
        prefix,
        model_path,
        head,
        body_rows
    );
    Ok(page(&spec.name, &body))
}

/// Form input fields for a spec: writable columns, sensitive ones replaced by
/// a `password` input on the user model.
fn form_fields(spec: &ModelSpec, current: Option<&Value>) -> String {
    let mut fields = String::new();
    for col in spec.writable_columns() {
        if col.sensitive {
            if spec.name == "user" && col.name == "password_hash" {
                fields.push_str(
                    "<label>password <input name=\"password\" type=\"password\"></label><br>\n",
                );
            }
            continue;
        }
        let value = current
            .and_then(|row| row.get(&col.name))
            .map(cell_text)
            .unwrap_or_default();
        let input = match col.col_type {
            ColumnType::Boolean => format!(
                "<input name=\"{}\" type=\"checkbox\"{}>",
                encode_text(&col.name),
                if value == "true" { " checked" } else { "" }
            ),
            _ => format!(
                "<input name=\"{}\" value=\"{}\">",
                encode_text(&col.name),
                encode_text(&value)
            ),
        };
        fields.push_str(&format!(
            "<label>{} {}</label><br>\n",
            encode_text(&col.name),
            input
        ));
    }
    fields
}

fn render_form(spec: &ModelSpec, action: &str, current: Option<&Value>) -> Html<String> {
    let body = format!(
        "<h1>{}</h1>\n<form method=\"post\" action=\"{}\">\n{}<button type=\"submit\">Save</button>\n</form>",
        encode_text(&spec.name),
        action,
        form_fields(spec, current)
    );
    page(&spec.name, &body)
}

/// Coerce one submitted form value by column type. Ok(None) means "leave
/// unset" (empty optional fields); an unparsable value is a 400.
fn form_value_for_column(col: &ColumnSpec, s: &str) -> Result<Option<Value>, AppError> {
    if s.is_empty() && col.col_type != ColumnType::Text {
        return Ok(None);
    }
    let bad = || AppError::BadRequest(format!("invalid value for {}", col.name));
    Ok(Some(match col.col_type {
        ColumnType::Integer | ColumnType::BigInt => {
            Value::from(s.parse::<i64>().map_err(|_| bad())?)
        }
        ColumnType::Float => Value::from(s.parse::<f64>().map_err(|_| bad())?),
        ColumnType::Boolean => Value::Bool(s == "on" || s == "true"),
        ColumnType::Json => serde_json::from_str(s).map_err(|_| bad())?,
        ColumnType::Text | ColumnType::Timestamp | ColumnType::Uuid => {
            Value::String(s.to_string())
        }
    }))
}

/// Convert a form submission to a validated write body for the spec.
fn form_to_body(
    spec: &ModelSpec,
    form: HashMap<String, String>,
) -> Result<HashMap<String, Value>, AppError> {
    let mut body = HashMap::new();
    for (key, raw) in form {
        if key == "password" && spec.name == "user" {
            if !raw.is_empty() {
                body.insert(key, Value::String(raw));
            }
            continue;
        }
        let col = spec.column_named(&key).ok_or_else(|| AppError::UnknownAttribute {
            model: spec.name.clone(),
            attr: key.clone(),
        })?;
        if let Some(v) = form_value_for_column(col, &raw)? {
            body.insert(key, v);
        }
    }
    // unchecked checkboxes are absent from the submission
    for col in spec.writable_columns() {
        if col.col_type == ColumnType::Boolean && !body.contains_key(&col.name) {
            body.insert(col.name.clone(), Value::Bool(false));
        }
    }
    if spec.name == "user" {
        return prepare_user_write(body);
    }
    Ok(body)
}

pub async fn model_add_form(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(model): Path<String>,
) -> Result<Html<String>, AppError> {
    let spec = state.registry.get(&model).map_err(|_| ui_not_found())?;
    let action = format!("{}/{}/add", state.admin_prefix, spec.name.to_lowercase());
    Ok(render_form(spec, &action, None))
}

pub async fn model_add(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(model): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let spec = state.registry.get(&model).map_err(|_| ui_not_found())?;
    let body = form_to_body(spec, form)?;
    ensure_known_attributes(spec, &body)?;
    ensure_required_for_create(spec, &body)?;
    CrudService::create(&state.pool, spec, &body).await?;
    Ok(Redirect::to(&format!(
        "{}/{}",
        state.admin_prefix,
        spec.name.to_lowercase()
    )))
}

pub async fn model_edit_form(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path((model, id)): Path<(String, i64)>,
) -> Result<Html<String>, AppError> {
    let spec = state.registry.get(&model).map_err(|_| ui_not_found())?;
    let row = CrudService::read(&state.pool, spec, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", spec.name, id)))?;
    let action = format!(
        "{}/{}/{}/edit",
        state.admin_prefix,
        spec.name.to_lowercase(),
        id
    );
    Ok(render_form(spec, &action, Some(&row)))
}

pub async fn model_edit(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path((model, id)): Path<(String, i64)>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let spec = state.registry.get(&model).map_err(|_| ui_not_found())?;
    let body = form_to_body(spec, form)?;
    ensure_known_attributes(spec, &body)?;
    CrudService::update(&state.pool, spec, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", spec.name, id)))?;
    Ok(Redirect::to(&format!(
        "{}/{}",
        state.admin_prefix,
        spec.name.to_lowercase()
    )))
}
