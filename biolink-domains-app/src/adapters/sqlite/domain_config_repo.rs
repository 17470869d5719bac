//! `DomainConfigRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, SqlErr,
    sea_query::{Expr, Func, OnConflict},
};

use biolink_domains_core::error::{CoreError, CoreResult};
use biolink_domains_core::traits::DomainConfigRepository;
use biolink_domains_core::types::{DeploymentStatus, DomainConfig, SettingsPatch};
use biolink_domains_doh::normalize_domain;

use super::SqliteStore;
use super::entity::domain_config::{self, Column};

fn parse_time(field: &str, value: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::SerializationError(format!("Invalid {field}: {e}")))
}

fn parse_optional_time(field: &str, value: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    value.map(|v| parse_time(field, v)).transpose()
}

impl domain_config::Model {
    /// Convert a `SeaORM` row model into `(account_id, DomainConfig)`.
    fn into_config(self) -> CoreResult<(String, DomainConfig)> {
        let deployment_status = self
            .deployment_status
            .parse()
            .map_err(CoreError::SerializationError)?;
        let root_domain_mode = self
            .root_domain_mode
            .parse()
            .map_err(CoreError::SerializationError)?;

        let config = DomainConfig {
            custom_domain: self.custom_domain,
            domain_verified: self.domain_verified != 0,
            deployment_status,
            use_domain_for_shortlinks: self.use_domain_for_shortlinks != 0,
            root_domain_mode,
            root_domain_redirect_url: self.root_domain_redirect_url,
            verified_at: parse_optional_time("verified_at", self.verified_at.as_deref())?,
            deploying_since: parse_optional_time(
                "deploying_since",
                self.deploying_since.as_deref(),
            )?,
            activated_at: parse_optional_time("activated_at", self.activated_at.as_deref())?,
            updated_at: parse_time("updated_at", &self.updated_at)?,
        };
        Ok((self.account_id, config))
    }
}

/// Convert a configuration into a `SeaORM` active model for upsert.
fn config_to_active_model(account_id: &str, config: &DomainConfig) -> domain_config::ActiveModel {
    domain_config::ActiveModel {
        account_id: Set(account_id.to_string()),
        custom_domain: Set(config.custom_domain.clone()),
        normalized_domain: Set(config.normalized_domain()),
        domain_verified: Set(i32::from(config.domain_verified)),
        deployment_status: Set(config.deployment_status.as_str().to_string()),
        use_domain_for_shortlinks: Set(i32::from(config.use_domain_for_shortlinks)),
        root_domain_mode: Set(config.root_domain_mode.as_str().to_string()),
        root_domain_redirect_url: Set(config.root_domain_redirect_url.clone()),
        verified_at: Set(config.verified_at.map(|dt| dt.to_rfc3339())),
        deploying_since: Set(config.deploying_since.map(|dt| dt.to_rfc3339())),
        activated_at: Set(config.activated_at.map(|dt| dt.to_rfc3339())),
        updated_at: Set(config.updated_at.to_rfc3339()),
    }
}

/// Map a write failure; the verified-domain index surfaces as a conflict.
fn write_err(e: &DbErr, domain: &str) -> CoreError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
        log::warn!("Verified domain uniqueness violated: {detail}");
        return CoreError::DomainConflict {
            domain: domain.to_string(),
        };
    }
    CoreError::StorageError(format!("Failed to save domain config: {e}"))
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

impl SqliteStore {
    async fn find_row(&self, account_id: &str) -> CoreResult<Option<domain_config::Model>> {
        domain_config::Entity::find_by_id(account_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query domain config: {e}")))
    }

    async fn load(&self, account_id: &str) -> CoreResult<DomainConfig> {
        self.find_by_account(account_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))
    }

    /// Insert a default row unless the account already has one.
    async fn ensure_row(&self, account_id: &str) -> CoreResult<()> {
        let row = config_to_active_model(account_id, &DomainConfig::default());
        let result = domain_config::Entity::insert(row)
            .on_conflict(OnConflict::column(Column::AccountId).do_nothing().to_owned())
            .exec(&self.db)
            .await;
        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(CoreError::StorageError(format!(
                "Failed to create domain config: {e}"
            ))),
        }
    }
}

#[async_trait]
impl DomainConfigRepository for SqliteStore {
    async fn find_by_account(&self, account_id: &str) -> CoreResult<Option<DomainConfig>> {
        self.find_row(account_id)
            .await?
            .map(|row| row.into_config().map(|(_, config)| config))
            .transpose()
    }

    async fn save(&self, account_id: &str, config: &DomainConfig) -> CoreResult<()> {
        domain_config::Entity::insert(config_to_active_model(account_id, config))
            .on_conflict(
                OnConflict::column(Column::AccountId)
                    .update_columns([
                        Column::CustomDomain,
                        Column::NormalizedDomain,
                        Column::DomainVerified,
                        Column::DeploymentStatus,
                        Column::UseDomainForShortlinks,
                        Column::RootDomainMode,
                        Column::RootDomainRedirectUrl,
                        Column::VerifiedAt,
                        Column::DeployingSince,
                        Column::ActivatedAt,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| write_err(&e, &config.normalized_domain().unwrap_or_default()))?;
        Ok(())
    }

    async fn replace_domain(
        &self,
        account_id: &str,
        domain: Option<&str>,
    ) -> CoreResult<DomainConfig> {
        self.ensure_row(account_id).await?;
        let normalized = domain.map(normalize_domain);
        domain_config::Entity::update_many()
            .col_expr(Column::CustomDomain, Expr::value(domain.map(str::to_string)))
            .col_expr(Column::NormalizedDomain, Expr::value(normalized.clone()))
            .col_expr(Column::DomainVerified, Expr::value(0))
            .col_expr(
                Column::DeploymentStatus,
                Expr::value(DeploymentStatus::Pending.as_str()),
            )
            .col_expr(Column::VerifiedAt, Expr::value(Option::<String>::None))
            .col_expr(Column::DeployingSince, Expr::value(Option::<String>::None))
            .col_expr(Column::ActivatedAt, Expr::value(Option::<String>::None))
            .col_expr(Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(Column::AccountId.eq(account_id))
            .exec(&self.db)
            .await
            .map_err(|e| write_err(&e, &normalized.unwrap_or_default()))?;
        self.load(account_id).await
    }

    async fn mark_verified(&self, account_id: &str, normalized_domain: &str) -> CoreResult<bool> {
        let domain = normalize_domain(normalized_domain);
        let now = now_rfc3339();
        let pending = DeploymentStatus::Pending.as_str();
        let result = domain_config::Entity::update_many()
            .col_expr(Column::DomainVerified, Expr::value(1))
            .col_expr(
                Column::VerifiedAt,
                Func::coalesce([Expr::col(Column::VerifiedAt), Expr::value(now.clone())]).into(),
            )
            .col_expr(
                Column::DeployingSince,
                Expr::case(Column::DeploymentStatus.eq(pending), now.clone())
                    .finally(Expr::col(Column::DeployingSince))
                    .into(),
            )
            .col_expr(
                Column::DeploymentStatus,
                Expr::case(
                    Column::DeploymentStatus.eq(pending),
                    DeploymentStatus::Deploying.as_str(),
                )
                .finally(Expr::col(Column::DeploymentStatus))
                .into(),
            )
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::AccountId.eq(account_id))
            .filter(Column::NormalizedDomain.eq(domain.as_str()))
            .filter(
                Condition::any()
                    .add(Column::DomainVerified.eq(0))
                    .add(Column::DeploymentStatus.eq(pending)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| write_err(&e, &domain))?;
        Ok(result.rows_affected > 0)
    }

    async fn update_settings(
        &self,
        account_id: &str,
        patch: &SettingsPatch,
    ) -> CoreResult<DomainConfig> {
        self.ensure_row(account_id).await?;
        let mut update = domain_config::Entity::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(Column::AccountId.eq(account_id));
        if let Some(enabled) = patch.use_domain_for_shortlinks {
            update = update.col_expr(Column::UseDomainForShortlinks, Expr::value(i32::from(enabled)));
        }
        if let Some(mode) = patch.root_domain_mode {
            update = update.col_expr(Column::RootDomainMode, Expr::value(mode.as_str()));
        }
        if let Some(url) = &patch.root_domain_redirect_url {
            update = update.col_expr(Column::RootDomainRedirectUrl, Expr::value(url.clone()));
        }
        update
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to update domain settings: {e}")))?;
        self.load(account_id).await
    }

    async fn find_verified_owner(&self, normalized_domain: &str) -> CoreResult<Option<String>> {
        Ok(self
            .find_by_domain(normalized_domain)
            .await?
            .map(|(account_id, _)| account_id))
    }

    async fn find_by_domain(
        &self,
        normalized_domain: &str,
    ) -> CoreResult<Option<(String, DomainConfig)>> {
        domain_config::Entity::find()
            .filter(Column::NormalizedDomain.eq(normalize_domain(normalized_domain)))
            .filter(Column::DomainVerified.eq(1))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query domain owner: {e}")))?
            .map(domain_config::Model::into_config)
            .transpose()
    }

    async fn update_deployment_status(
        &self,
        account_id: &str,
        status: DeploymentStatus,
    ) -> CoreResult<DeploymentStatus> {
        let Some(from) = status.previous() else {
            return Ok(self.load(account_id).await?.deployment_status);
        };

        let now = now_rfc3339();
        let mut update = domain_config::Entity::update_many()
            .col_expr(Column::DeploymentStatus, Expr::value(status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now.clone()));
        update = match status {
            DeploymentStatus::Deploying => {
                update.col_expr(Column::DeployingSince, Expr::value(now))
            }
            DeploymentStatus::Active => update
                .col_expr(Column::ActivatedAt, Expr::value(now.clone()))
                .col_expr(
                    Column::DeployingSince,
                    Func::coalesce([Expr::col(Column::DeployingSince), Expr::value(now)]).into(),
                ),
            DeploymentStatus::Pending => update,
        };
        let result = update
            .filter(Column::AccountId.eq(account_id))
            .filter(Column::DeploymentStatus.eq(from.as_str()))
            .filter(Column::DomainVerified.eq(1))
            .filter(Column::CustomDomain.is_not_null())
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to update deployment: {e}")))?;

        if result.rows_affected > 0 {
            log::info!("Account {account_id} deployment advanced to {status}");
            return Ok(status);
        }

        let current = self.load(account_id).await?;
        if current.deployment_status.advances_to(status) {
            return Err(CoreError::ValidationError(format!(
                "Deployment for account {account_id} cannot move from {} to {status}",
                current.deployment_status
            )));
        }
        Ok(current.deployment_status)
    }
}
