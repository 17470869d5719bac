//! Dashboard endpoints for the account's custom domain

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use biolink_domains_app::AppState;
use biolink_domains_core::types::{
    DnsInstructions, DomainConfig, DomainConfigUpdate, OkResponse, SetupStep,
};

use crate::account::AccountId;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub domain: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveDomainRequest {
    pub domain: String,
}

/// Configuration plus the values the dashboard derives from it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainView {
    #[serde(flatten)]
    pub config: DomainConfig,
    pub setup_step: SetupStep,
    pub dns_instructions: Option<DnsInstructions>,
    pub shortlink_base_url: String,
}

/// `GET /api/domain/availability?domain=`
pub async fn check_availability(
    state: web::Data<AppState>,
    account: AccountId,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, ApiError> {
    let availability = state
        .lifecycle_service
        .check_domain_availability(account.as_str(), &query.domain)
        .await?;
    Ok(HttpResponse::Ok().json(availability))
}

/// `GET /api/domain`
pub async fn get_domain(
    state: web::Data<AppState>,
    account: AccountId,
) -> Result<HttpResponse, ApiError> {
    let config = state
        .lifecycle_service
        .get_domain_config(account.as_str())
        .await?;
    let dns_instructions = state
        .lifecycle_service
        .dns_instructions(account.as_str())
        .await?;
    let view = DomainView {
        setup_step: config.setup_step(),
        shortlink_base_url: config.shortlink_base_url(&state.ctx.settings().app_domain),
        dns_instructions,
        config,
    };
    Ok(HttpResponse::Ok().json(view))
}

/// `PUT /api/domain`
pub async fn save_domain(
    state: web::Data<AppState>,
    account: AccountId,
    body: web::Json<SaveDomainRequest>,
) -> Result<HttpResponse, ApiError> {
    state
        .lifecycle_service
        .save_domain(account.as_str(), &body.domain)
        .await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

/// `POST /api/domain/verify`
///
/// A negative result is still `200`; only lookup plumbing errors are not.
pub async fn verify_domain(
    state: web::Data<AppState>,
    account: AccountId,
) -> Result<HttpResponse, ApiError> {
    let result = state
        .lifecycle_service
        .verify_domain(account.as_str())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// `DELETE /api/domain`
pub async fn delete_domain(
    state: web::Data<AppState>,
    account: AccountId,
) -> Result<HttpResponse, ApiError> {
    state
        .lifecycle_service
        .delete_domain(account.as_str())
        .await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

/// `PATCH /api/domain/config`
pub async fn update_config(
    state: web::Data<AppState>,
    account: AccountId,
    body: web::Json<DomainConfigUpdate>,
) -> Result<HttpResponse, ApiError> {
    state
        .lifecycle_service
        .update_domain_config(account.as_str(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

/// `GET /api/domain/deployment`
pub async fn deployment_status(
    state: web::Data<AppState>,
    account: AccountId,
) -> Result<HttpResponse, ApiError> {
    let report = state
        .deployment_service
        .refresh_status(account.as_str())
        .await?;
    Ok(HttpResponse::Ok().json(report))
}
