//! Routes and handlers.
//!
//! | Route                        | Requirement                    |
//! |------------------------------|--------------------------------|
//! | `GET    /api/tributes`       | public                         |
//! | `GET    /api/tributes/{slug}`| public                         |
//! | `POST   /api/tributes`       | requires auth                  |
//! | `POST   /api/login`          | public                         |
//! | `POST   /api/validate`       | requires auth                  |
//! | `DELETE /api/logout`         | public                         |
//! | `GET    /dashboard`          | requires auth                  |
//! | `GET    /admin`              | requires role `administrator`  |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;

use crate::envelope::Envelope;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::policy::RouteRequirement;
use crate::request::RequestContext;
use crate::session::SessionCookies;
use crate::wordpress::{LoginRequest, NewTribute};

use super::response::with_cookies;

/// Role required for `/admin`.
pub const ADMIN_ROLE: &str = "administrator";

/// Shared state for the router.
#[derive(Debug, Clone)]
pub struct AppState {
    gateway: Gateway,
    cookies: SessionCookies,
}

impl AppState {
    /// Wraps a gateway; session cookies use the gateway's configured keys.
    pub fn new(gateway: Gateway) -> Self {
        let cookies = SessionCookies::new(gateway.config().cookie_keys().to_vec());
        Self { gateway, cookies }
    }
}

/// Builds the axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tributes", get(list_tributes).post(create_tribute))
        .route("/api/tributes/{slug}", get(get_tribute))
        .route("/api/login", post(login))
        .route("/api/validate", post(validate))
        .route("/api/logout", delete(logout))
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .with_state(state)
}

fn request_span(ctx: &RequestContext) -> tracing::Span {
    tracing::info_span!("request", request_id = %ctx.request_id())
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn list_tributes(State(state): State<AppState>, ctx: RequestContext) -> Response {
    match state.gateway.guard(&ctx, &RouteRequirement::Public) {
        Ok(credential) => state
            .gateway
            .all_tributes(&credential)
            .instrument(request_span(&ctx))
            .await
            .into_response(),
        Err(outcome) => outcome.into_response(),
    }
}

async fn get_tribute(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut ctx: RequestContext,
) -> Response {
    ctx.add_path_param("slug", slug);
    let credential = match state.gateway.guard(&ctx, &RouteRequirement::Public) {
        Ok(credential) => credential,
        Err(outcome) => return outcome.into_response(),
    };
    match ctx.path_param("slug") {
        Some(slug) => state
            .gateway
            .tribute(&credential, slug)
            .instrument(request_span(&ctx))
            .await
            .into_response(),
        None => Envelope::from(GatewayError::InvalidInput("missing slug".to_string())).into_response(),
    }
}

async fn create_tribute(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<NewTribute>, JsonRejection>,
) -> Response {
    let credential = match state.gateway.guard(&ctx, &RouteRequirement::RequiresAuth) {
        Ok(credential) => credential,
        Err(outcome) => return outcome.into_response(),
    };
    match body {
        Ok(Json(tribute)) => state
            .gateway
            .create_tribute(&credential, &tribute)
            .instrument(request_span(&ctx))
            .await
            .into_response(),
        Err(rejection) => {
            Envelope::from(GatewayError::InvalidInput(rejection.body_text())).into_response()
        }
    }
}

async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<LoginForm>, JsonRejection>,
) -> Response {
    let form = match body {
        Ok(Json(form)) => form,
        Err(rejection) => {
            return Envelope::from(GatewayError::InvalidInput(rejection.body_text())).into_response()
        }
    };

    let login = LoginRequest::new(form.username, form.password);
    match state.gateway.login(&login).instrument(request_span(&ctx)).await {
        Ok(session) => {
            let envelope = match serde_json::to_value(&session.user) {
                Ok(user) => Envelope::success(200, user),
                Err(_) => return Envelope::from(GatewayError::MalformedResponse).into_response(),
            };
            let cookies: Vec<String> = state.cookies.issue(&session.token).into_iter().collect();
            if cookies.is_empty() {
                tracing::warn!(request_id = %ctx.request_id(), "login succeeded but no session cookie was issued");
                return Envelope::from(GatewayError::MalformedResponse).into_response();
            }
            with_cookies(envelope.into_response(), &cookies)
        }
        Err(err) => {
            tracing::info!(request_id = %ctx.request_id(), status = err.status(), "login failed");
            Envelope::from(err).into_response()
        }
    }
}

async fn validate(State(state): State<AppState>, ctx: RequestContext) -> Response {
    match state.gateway.guard(&ctx, &RouteRequirement::RequiresAuth) {
        Ok(credential) => state
            .gateway
            .validate_token(&credential)
            .instrument(request_span(&ctx))
            .await
            .into_response(),
        Err(outcome) => outcome.into_response(),
    }
}

async fn logout(State(state): State<AppState>, ctx: RequestContext) -> Response {
    tracing::info!(request_id = %ctx.request_id(), "logout");
    let (cookies, envelope) = state.cookies.logout();
    with_cookies(envelope.into_response(), &cookies)
}

async fn dashboard(State(state): State<AppState>, ctx: RequestContext) -> Response {
    match state.gateway.guard(&ctx, &RouteRequirement::RequiresAuth) {
        Ok(credential) => Envelope::success(
            200,
            json!({
                "display_name": credential.display_name(),
                "role": credential.role(),
            }),
        )
        .into_response(),
        Err(outcome) => outcome.into_response(),
    }
}

async fn admin(State(state): State<AppState>, ctx: RequestContext) -> Response {
    match state.gateway.guard(&ctx, &RouteRequirement::role(ADMIN_ROLE)) {
        Ok(credential) => Envelope::success(
            200,
            json!({
                "display_name": credential.display_name(),
                "role": credential.role(),
            }),
        )
        .into_response(),
        Err(outcome) => outcome.into_response(),
    }
}
