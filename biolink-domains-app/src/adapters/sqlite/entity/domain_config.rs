use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "domain_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,
    pub custom_domain: Option<String>,
    pub normalized_domain: Option<String>,
    pub domain_verified: i32,
    pub deployment_status: String,
    pub use_domain_for_shortlinks: i32,
    pub root_domain_mode: String,
    pub root_domain_redirect_url: Option<String>,
    pub verified_at: Option<String>,
    pub deploying_since: Option<String>,
    pub activated_at: Option<String>,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
