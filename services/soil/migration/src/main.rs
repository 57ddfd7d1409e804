use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(soilscan_soil_migration::Migrator).await;
}
