// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::SurfaceError;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("迁移错误: {0}")]
    MigrationError(String),
}

/// 爬取错误类型
///
/// 除 `Launch` 以外都只终止当前任务。
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("浏览器启动失败: {0}")]
    Launch(#[source] SurfaceError),

    #[error("首页加载失败: {0}")]
    Navigation(#[source] SurfaceError),

    #[error("第 {page} 页未出现数据行: {source}")]
    RowsNotVisible {
        page: usize,
        #[source]
        source: SurfaceError,
    },

    #[error("翻页后页面未稳定: {0}")]
    PageSettle(#[source] SurfaceError),

    #[error("浏览界面错误: {0}")]
    Surface(#[from] SurfaceError),
}

/// 任务文件错误类型
#[derive(Error, Debug)]
pub enum TaskSourceError {
    #[error("任务文件不存在: {0}")]
    NotFound(String),

    #[error("任务文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("任务文件解析失败: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("第 {row} 个任务格式无效: {reason}")]
    InvalidTask { row: usize, reason: String },
}

/// 目标地址构造错误类型
#[derive(Error, Debug)]
pub enum TargetUrlError {
    #[error("基础地址无效: {0}")]
    InvalidBase(#[from] url::ParseError),

    #[error("查询参数编码失败: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}
