use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SoilAnalyses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SoilAnalyses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SoilAnalyses::UserId).uuid().not_null())
                    .col(ColumnDef::new(SoilAnalyses::ImageFilename).string().not_null())
                    .col(ColumnDef::new(SoilAnalyses::ImagePath).string().not_null())
                    .col(ColumnDef::new(SoilAnalyses::SoilType).string().not_null())
                    .col(ColumnDef::new(SoilAnalyses::Confidence).double().not_null())
                    .col(ColumnDef::new(SoilAnalyses::Description).text().not_null())
                    .col(ColumnDef::new(SoilAnalyses::Characteristics).text().not_null())
                    .col(ColumnDef::new(SoilAnalyses::RecommendedCrops).text().not_null())
                    .col(ColumnDef::new(SoilAnalyses::Recommendations).text().not_null())
                    .col(
                        ColumnDef::new(SoilAnalyses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SoilAnalyses::Table, SoilAnalyses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SoilAnalyses::Table)
                    .col(SoilAnalyses::UserId)
                    .col(SoilAnalyses::CreatedAt)
                    .name("idx_soil_analyses_user_id_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SoilAnalyses::Table)
                    .col(SoilAnalyses::CreatedAt)
                    .name("idx_soil_analyses_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SoilAnalyses::Table)
                    .col(SoilAnalyses::SoilType)
                    .name("idx_soil_analyses_soil_type")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SoilAnalyses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SoilAnalyses {
    Table,
    Id,
    UserId,
    ImageFilename,
    ImagePath,
    SoilType,
    Confidence,
    Description,
    Characteristics,
    RecommendedCrops,
    Recommendations,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
