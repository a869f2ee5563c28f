use sea_orm::entity::prelude::*;

/// A gift exchange run by administrators.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// `active` or `closed`.
    pub status: String,
    pub closure_message: Option<String>,
    pub require_auth_codes: bool,
    pub auth_code_expiry_hours: i32,
    pub hide_pairings_from_admins: bool,
    /// JSON array of strings, in display order.
    pub rules: Json,
    pub created_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
    #[sea_orm(has_many = "super::pairings::Entity")]
    Pairings,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::pairings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pairings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
