use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminUsers::Provider).string().not_null())
                    .col(ColumnDef::new(AdminUsers::ProviderUserId).string())
                    .col(ColumnDef::new(AdminUsers::Email).string())
                    .col(ColumnDef::new(AdminUsers::Username).string().not_null())
                    .col(
                        ColumnDef::new(AdminUsers::IsSystemOwner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AdminUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(AdminUsers::Table)
                    .col(AdminUsers::Provider)
                    .col(AdminUsers::ProviderUserId)
                    .unique()
                    .name("idx_admin_users_provider_identity")
                    .to_owned(),
            )
            .await?;

        // Only one row may ever carry the owner flag.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_admin_users_single_owner \
                 ON admin_users (is_system_owner) WHERE is_system_owner",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminUsers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AdminUsers {
    Table,
    Id,
    Provider,
    ProviderUserId,
    Email,
    Username,
    IsSystemOwner,
    CreatedAt,
}
