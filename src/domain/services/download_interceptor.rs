// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{BrowsingSurface, DownloadWatch, ElementHandle, SurfaceError};
use std::time::Duration;
use tracing::{debug, warn};

/// 下载地址拦截器
///
/// 点击行内的下载按钮，只记录浏览器报告的下载地址，随即取消传输，
/// 文件内容不会被保留。
///
/// 上一行的监听器保存在调用方持有的 `lingering` 中。布置新监听器之前先把它
/// 收到的迟到下载全部取消，这些下载不会被记到下一行。
#[derive(Debug, Clone)]
pub struct DownloadInterceptor {
    trigger_selector: String,
    timeout: Duration,
}

impl DownloadInterceptor {
    pub fn new(trigger_selector: impl Into<String>, timeout: Duration) -> Self {
        Self {
            trigger_selector: trigger_selector.into(),
            timeout,
        }
    }

    /// 尝试捕获行的下载地址
    ///
    /// # 参数
    ///
    /// * `surface` - 当前浏览界面
    /// * `row` - 已通过校验的表格行
    /// * `label` - 指标名称，仅用于日志
    /// * `lingering` - 同一浏览界面上一次捕获留下的监听器
    ///
    /// # 返回值
    ///
    /// 捕获到的下载地址；没有下载按钮或捕获失败时返回空字符串
    pub async fn try_capture<S: BrowsingSurface>(
        &self,
        surface: &S,
        row: &S::Element,
        label: &str,
        lingering: &mut Option<S::Watch>,
    ) -> String {
        let trigger = match row.query(&self.trigger_selector).await {
            Ok(Some(trigger)) => trigger,
            Ok(None) => return String::new(),
            Err(e) => {
                warn!("Download trigger lookup failed for '{}': {}", label, e);
                return String::new();
            }
        };

        self.cancel_late(surface, lingering).await;

        match self.capture(surface, &trigger, lingering).await {
            Ok(url) => {
                debug!("Captured download url for '{}'", label);
                metrics::counter!("statcrawl_downloads_captured_total").increment(1);
                url
            }
            Err(e) => {
                warn!("Failed to intercept download for '{}': {}", label, e);
                metrics::counter!("statcrawl_downloads_failed_total").increment(1);
                String::new()
            }
        }
    }

    async fn cancel_late<S: BrowsingSurface>(&self, surface: &S, lingering: &mut Option<S::Watch>) {
        let Some(mut watch) = lingering.take() else {
            return;
        };
        while let Ok(late) = watch.next_download(Duration::ZERO).await {
            debug!("Cancelling late download from {}", late.url);
            metrics::counter!("statcrawl_downloads_late_total").increment(1);
            if let Err(e) = surface.cancel_download(&late).await {
                warn!("Failed to cancel late download {}: {}", late.id, e);
            }
        }
    }

    async fn capture<S: BrowsingSurface>(
        &self,
        surface: &S,
        trigger: &S::Element,
        lingering: &mut Option<S::Watch>,
    ) -> Result<String, SurfaceError> {
        let watch = lingering.insert(surface.arm_download().await?);
        trigger.click().await?;
        let download = watch.next_download(self.timeout).await?;

        surface.cancel_download(&download).await?;
        Ok(download.url)
    }
}
