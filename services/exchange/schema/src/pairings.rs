use sea_orm::entity::prelude::*;

/// One giver → receiver edge of an event's assignment.
/// Unique per `(event_id, giver_id)` and per `(event_id, receiver_id)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pairings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub giver_id: Uuid,
    pub receiver_id: Uuid,
    pub revealed: bool,
    pub revealed_at: Option<chrono::DateTime<chrono::Utc>>,
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
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::GiverId",
        to = "super::participants::Column::Id"
    )]
    Giver,
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::ReceiverId",
        to = "super::participants::Column::Id"
    )]
    Receiver,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
