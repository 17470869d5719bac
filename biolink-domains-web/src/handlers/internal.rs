//! Collaborator endpoints: deployment platform hook and edge router lookup
//!
//! Not authenticated per account; bind them to a private listener.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use biolink_domains_app::AppState;
use biolink_domains_core::types::OkResponse;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub host: String,
    #[serde(default = "root_path")]
    pub path: String,
}

fn root_path() -> String {
    "/".to_string()
}

/// `POST /internal/deployments/{account_id}/active`
pub async fn mark_active(
    state: web::Data<AppState>,
    account_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.deployment_service.mark_active(&account_id).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

/// `GET /internal/route?host=&path=`
pub async fn resolve_route(
    state: web::Data<AppState>,
    query: web::Query<RouteQuery>,
) -> Result<HttpResponse, ApiError> {
    let decision = state.router.route(&query.host, &query.path).await?;
    tracing::debug!(host = %query.host, path = %query.path, ?decision, "Resolved route");
    Ok(HttpResponse::Ok().json(decision))
}
