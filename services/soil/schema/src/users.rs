use sea_orm::entity::prelude::*;

/// Registered account. Created unverified; `is_verified` flips once a code is accepted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::soil_analyses::Entity")]
    SoilAnalyses,
}

impl Related<super::soil_analyses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SoilAnalyses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
