use sea_orm::entity::prelude::*;

/// Member of an event. `unique_link` is the capability for the reveal page.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,
    #[sea_orm(unique)]
    pub unique_link: String,
    /// JSON array of likes/dislikes, in display order.
    pub moodboard: Option<Json>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id"
    )]
    Event,
    #[sea_orm(has_many = "super::auth_codes::Entity")]
    AuthCodes,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::auth_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthCodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
