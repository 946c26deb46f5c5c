// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{BrowsingSurface, ElementHandle, SurfaceError};
use std::time::Duration;

/// 翻页结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    /// 已翻到下一页且网络已静默
    Advanced,
    /// 没有可用的下一页按钮，结果已取完
    Exhausted,
}

/// 分页器
#[derive(Debug, Clone)]
pub struct Pager {
    next_selector: String,
    settle_timeout: Duration,
}

impl Pager {
    pub fn new(next_selector: impl Into<String>, settle_timeout: Duration) -> Self {
        Self {
            next_selector: next_selector.into(),
            settle_timeout,
        }
    }

    async fn enabled_next<S: BrowsingSurface>(
        &self,
        surface: &S,
    ) -> Result<Option<S::Element>, SurfaceError> {
        let Some(next) = surface.query(&self.next_selector).await? else {
            return Ok(None);
        };
        if next.is_enabled().await? {
            Ok(Some(next))
        } else {
            Ok(None)
        }
    }

    /// 是否存在可用的下一页按钮
    pub async fn has_next_page<S: BrowsingSurface>(&self, surface: &S) -> Result<bool, SurfaceError> {
        Ok(self.enabled_next(surface).await?.is_some())
    }

    /// 翻到下一页并等待网络静默
    ///
    /// 按钮缺失或被禁用时返回 [`PageTurn::Exhausted`]，这是正常的结束信号。
    /// 静默等待超时以错误返回。
    pub async fn advance<S: BrowsingSurface>(&self, surface: &S) -> Result<PageTurn, SurfaceError> {
        let Some(next) = self.enabled_next(surface).await? else {
            return Ok(PageTurn::Exhausted);
        };
        next.click().await?;
        surface.wait_for_network_idle(self.settle_timeout).await?;
        Ok(PageTurn::Advanced)
    }
}
