// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::indicator_row::IndicatorRow;
use crate::domain::models::task_parameters::TaskMeta;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 指标数据仓库特质
///
/// 按复合键 (indicator, region, time, source, page_no, download_url) 去重，
/// 重复行被静默忽略。
#[async_trait]
pub trait IndicatorRepository: Send + Sync {
    /// 幂等的表结构初始化，首次使用前调用
    async fn init_schema(&self) -> Result<(), RepositoryError>;

    /// 保存一批数据行
    ///
    /// 整批在一个事务中写入。
    ///
    /// # 返回值
    ///
    /// 实际新增的行数
    async fn save_all(&self, rows: Vec<IndicatorRow>, meta: &TaskMeta)
        -> Result<u64, RepositoryError>;

    /// 删除全部记录，返回删除的行数
    async fn clear_all(&self) -> Result<u64, RepositoryError>;

    /// 当前存储的记录数
    async fn count(&self) -> Result<u64, RepositoryError>;
}
