use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pairings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pairings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Pairings::EventId).uuid().not_null())
                    .col(ColumnDef::new(Pairings::GiverId).uuid().not_null())
                    .col(ColumnDef::new(Pairings::ReceiverId).uuid().not_null())
                    .col(
                        ColumnDef::new(Pairings::Revealed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Pairings::RevealedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Pairings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(Pairings::GiverId).ne(Expr::col(Pairings::ReceiverId)))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pairings::Table, Pairings::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pairings::Table, Pairings::GiverId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pairings::Table, Pairings::ReceiverId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Pairings::Table)
                    .col(Pairings::EventId)
                    .col(Pairings::GiverId)
                    .unique()
                    .name("idx_pairings_event_giver")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Pairings::Table)
                    .col(Pairings::EventId)
                    .col(Pairings::ReceiverId)
                    .unique()
                    .name("idx_pairings_event_receiver")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pairings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Pairings {
    Table,
    Id,
    EventId,
    GiverId,
    ReceiverId,
    Revealed,
    RevealedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}

#[derive(Iden)]
enum Participants {
    Table,
    Id,
}
