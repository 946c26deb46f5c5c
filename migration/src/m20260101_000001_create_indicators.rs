use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Indicators::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Indicators::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Indicators::Zcode).text().null())
                    .col(ColumnDef::new(Indicators::IndicateName).text().null())
                    .col(ColumnDef::new(Indicators::SearchModeOne).integer().null())
                    .col(ColumnDef::new(Indicators::Area).text().null())
                    .col(ColumnDef::new(Indicators::BeginYear).integer().null())
                    .col(ColumnDef::new(Indicators::EndYear).integer().null())
                    .col(ColumnDef::new(Indicators::DataType).text().null())
                    .col(ColumnDef::new(Indicators::Time).text().not_null().default(""))
                    .col(ColumnDef::new(Indicators::Region).text().not_null().default(""))
                    .col(ColumnDef::new(Indicators::Indicator).text().not_null().default(""))
                    .col(ColumnDef::new(Indicators::Value).text().not_null().default(""))
                    .col(ColumnDef::new(Indicators::Unit).text().not_null().default(""))
                    .col(ColumnDef::new(Indicators::Source).text().not_null().default(""))
                    .col(ColumnDef::new(Indicators::PageNo).text().not_null().default(""))
                    .col(ColumnDef::new(Indicators::DownloadUrl).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Indicators::CrawledAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一页面上的同一行只保存一次
        manager
            .create_index(
                Index::create()
                    .name("idx_indicators_natural_key")
                    .table(Indicators::Table)
                    .if_not_exists()
                    .unique()
                    .col(Indicators::Indicator)
                    .col(Indicators::Region)
                    .col(Indicators::Time)
                    .col(Indicators::Source)
                    .col(Indicators::PageNo)
                    .col(Indicators::DownloadUrl)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_indicators_natural_key")
                    .table(Indicators::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Indicators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Indicators {
    Table,
    Id,
    Zcode,
    IndicateName,
    SearchModeOne,
    Area,
    BeginYear,
    EndYear,
    DataType,
    Time,
    Region,
    Indicator,
    Value,
    Unit,
    Source,
    PageNo,
    DownloadUrl,
    CrawledAt,
}
