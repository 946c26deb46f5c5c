// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::indicator_row::{IndicatorRow, RowFields};
use crate::engines::traits::{ElementHandle, SurfaceError};
use std::fmt;

/// 数据行至少需要的单元格数
pub const MIN_CELLS: usize = 8;
/// 指标名称所在列（从 0 开始）
pub const INDICATOR_COLUMN: usize = 3;

/// 候选行被排除的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// 没有渲染几何信息或高度为 0
    NotRendered,
    /// 单元格数量不足
    TooFewCells(usize),
    /// 指标名称为空
    EmptyIndicator,
    /// 读取过程中节点失效
    Detached(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RejectReason::NotRendered => write!(f, "not rendered"),
            RejectReason::TooFewCells(n) => write!(f, "only {} cells", n),
            RejectReason::EmptyIndicator => write!(f, "empty indicator"),
            RejectReason::Detached(e) => write!(f, "detached: {}", e),
        }
    }
}

/// 校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(IndicatorRow),
    Rejected(RejectReason),
}

/// 表格行校验器
///
/// 依次进行可见性、结构、内容三步检查，任何一步失败立即排除该行。
/// 翻页过程中页面会渲染出结构存在但内容为空的行，这三步检查用来过滤它们。
#[derive(Debug, Clone)]
pub struct RowValidator {
    cell_selector: String,
}

impl RowValidator {
    pub fn new(cell_selector: impl Into<String>) -> Self {
        Self {
            cell_selector: cell_selector.into(),
        }
    }

    /// 校验并提取一行
    ///
    /// 读取失败的行（节点已失效）按渲染噪声处理，返回 `Rejected`。
    pub async fn validate<E: ElementHandle>(&self, row: &E) -> Verdict {
        match self.check(row).await {
            Ok(verdict) => verdict,
            Err(e) => Verdict::Rejected(RejectReason::Detached(e.to_string())),
        }
    }

    async fn check<E: ElementHandle>(&self, row: &E) -> Result<Verdict, SurfaceError> {
        match row.bounding_box().await? {
            Some(b) if b.height > 0.0 => {}
            _ => return Ok(Verdict::Rejected(RejectReason::NotRendered)),
        }

        let cells = row.query_all(&self.cell_selector).await?;
        if cells.len() < MIN_CELLS {
            return Ok(Verdict::Rejected(RejectReason::TooFewCells(cells.len())));
        }

        let indicator = cells[INDICATOR_COLUMN].inner_text().await?;
        if indicator.trim().is_empty() {
            return Ok(Verdict::Rejected(RejectReason::EmptyIndicator));
        }

        let fields = RowFields {
            time: cells[1].inner_text().await?,
            region: cells[2].inner_text().await?,
            indicator,
            value: cells[4].inner_text().await?,
            unit: cells[5].inner_text().await?,
            source: cells[6].inner_text().await?,
            page_no: cells[7].inner_text().await?,
        };

        Ok(match IndicatorRow::new(fields) {
            Some(row) => Verdict::Accepted(row),
            None => Verdict::Rejected(RejectReason::EmptyIndicator),
        })
    }
}
