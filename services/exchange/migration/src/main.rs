use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(santa_exchange_migration::Migrator).await;
}
