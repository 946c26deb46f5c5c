// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::indicator_row::IndicatorRow;
use crate::domain::models::task_parameters::TaskMeta;
use crate::domain::repositories::indicator_repository::IndicatorRepository;
use crate::infrastructure::database::entities::indicator;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;
use tracing::debug;

/// 单条 INSERT 语句携带的行数上限
///
/// 每行 15 个绑定参数，保持在 SQLite 的参数数量限制以内。
const INSERT_CHUNK_SIZE: usize = 50;

/// 指标数据仓库实现
pub struct IndicatorRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl IndicatorRepositoryImpl {
    /// 创建新的指标数据仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的指标数据仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn to_active_model(row: &IndicatorRow, meta: &TaskMeta) -> indicator::ActiveModel {
        indicator::ActiveModel {
            id: NotSet,
            zcode: Set(meta.zcode.clone()),
            indicate_name: Set(meta.indicate_name.clone()),
            search_mode_one: Set(meta.search_mode_one),
            area: Set(meta.area.clone()),
            begin_year: Set(meta.begin_year),
            end_year: Set(meta.end_year),
            data_type: Set(meta.data_type.clone()),
            time: Set(row.time().to_string()),
            region: Set(row.region().to_string()),
            indicator: Set(row.indicator().to_string()),
            value: Set(row.value().to_string()),
            unit: Set(row.unit().to_string()),
            source: Set(row.source().to_string()),
            page_no: Set(row.page_no().to_string()),
            download_url: Set(row.download_url().to_string()),
        }
    }
}

fn db_err(e: DbErr) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl IndicatorRepository for IndicatorRepositoryImpl {
    async fn init_schema(&self) -> Result<(), RepositoryError> {
        Migrator::up(self.db.as_ref(), None)
            .await
            .map_err(|e| RepositoryError::MigrationError(e.to_string()))
    }

    async fn save_all(
        &self,
        rows: Vec<IndicatorRow>,
        meta: &TaskMeta,
    ) -> Result<u64, RepositoryError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        let mut inserted = 0;

        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            let models = chunk.iter().map(|row| Self::to_active_model(row, meta));
            let result = indicator::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        indicator::Column::Indicator,
                        indicator::Column::Region,
                        indicator::Column::Time,
                        indicator::Column::Source,
                        indicator::Column::PageNo,
                        indicator::Column::DownloadUrl,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await;

            inserted += match result {
                Ok(n) => n,
                // 整块都命中已有记录
                Err(DbErr::RecordNotInserted) => 0,
                Err(e) => return Err(db_err(e)),
            };
        }

        txn.commit().await.map_err(db_err)?;
        debug!("Inserted {} of {} rows", inserted, rows.len());
        Ok(inserted)
    }

    async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let result = indicator::Entity::delete_many()
            .exec(self.db.as_ref())
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        indicator::Entity::find()
            .count(self.db.as_ref())
            .await
            .map_err(db_err)
    }
}
