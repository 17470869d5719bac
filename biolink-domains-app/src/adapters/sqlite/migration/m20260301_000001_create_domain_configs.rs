use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Name of the index that keeps a verified domain unique across accounts
pub const VERIFIED_DOMAIN_INDEX: &str = "idx_domain_configs_verified_domain";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DomainConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DomainConfig::AccountId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DomainConfig::CustomDomain).string().null())
                    .col(ColumnDef::new(DomainConfig::NormalizedDomain).string().null())
                    .col(
                        ColumnDef::new(DomainConfig::DomainVerified)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DomainConfig::DeploymentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(DomainConfig::UseDomainForShortlinks)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(DomainConfig::RootDomainMode)
                            .string()
                            .not_null()
                            .default("bio"),
                    )
                    .col(
                        ColumnDef::new(DomainConfig::RootDomainRedirectUrl)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(DomainConfig::VerifiedAt).string().null())
                    .col(ColumnDef::new(DomainConfig::DeployingSince).string().null())
                    .col(ColumnDef::new(DomainConfig::ActivatedAt).string().null())
                    .col(ColumnDef::new(DomainConfig::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Partial index: any number of pending claims, one verified owner.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {VERIFIED_DOMAIN_INDEX} \
                 ON domain_configs (normalized_domain) WHERE domain_verified = 1"
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {VERIFIED_DOMAIN_INDEX}"))
            .await?;
        manager
            .drop_table(Table::drop().table(DomainConfig::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum DomainConfig {
    #[sea_orm(iden = "domain_configs")]
    Table,
    AccountId,
    CustomDomain,
    NormalizedDomain,
    DomainVerified,
    DeploymentStatus,
    UseDomainForShortlinks,
    RootDomainMode,
    RootDomainRedirectUrl,
    VerifiedAt,
    DeployingSince,
    ActivatedAt,
    UpdatedAt,
}
