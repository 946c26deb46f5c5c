// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{CrawlerSettings, SelectorSettings};
use crate::domain::models::indicator_row::{IndicatorRow, PageCycleResult};
use crate::domain::models::task_parameters::SortPreference;
use crate::domain::services::download_interceptor::DownloadInterceptor;
use crate::domain::services::pager::{PageTurn, Pager};
use crate::domain::services::row_validator::{RowValidator, Verdict};
use crate::engines::traits::{BrowsingSurface, ElementHandle, SurfaceError, SurfaceLauncher};
use crate::utils::errors::CrawlError;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// 爬取参数
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub row_selector: String,
    pub cell_selector: String,
    pub next_selector: String,
    pub sort_selector: String,
    pub download_selector: String,
    /// 首页导航与网络静默等待的上限
    pub navigation_timeout: Duration,
    /// 等待数据行出现的上限
    pub row_wait_timeout: Duration,
    /// 等待下载事件的上限
    pub download_timeout: Duration,
    /// 两页之间的固定间隔
    pub page_delay: Duration,
}

impl CrawlOptions {
    pub fn from_settings(crawler: &CrawlerSettings, selectors: &SelectorSettings) -> Self {
        Self {
            row_selector: selectors.row.clone(),
            cell_selector: selectors.cell.clone(),
            next_selector: selectors.next_page.clone(),
            sort_selector: selectors.similarity_sort.clone(),
            download_selector: selectors.download_trigger.clone(),
            navigation_timeout: Duration::from_millis(crawler.navigation_timeout_ms),
            row_wait_timeout: Duration::from_millis(crawler.row_wait_timeout_ms),
            download_timeout: Duration::from_millis(crawler.download_timeout_ms),
            page_delay: Duration::from_millis(crawler.page_delay_ms),
        }
    }
}

/// 单个任务的爬取请求
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub target_url: String,
    /// 最多遍历的页数
    pub page_budget: usize,
    pub capture_downloads: bool,
    pub sort: SortPreference,
}

/// 爬取结束的原因
#[derive(Debug)]
pub enum StopReason {
    /// 下一页按钮缺失或被禁用
    Exhausted,
    /// 达到页数上限
    PageBudgetReached,
    /// 任务级致命错误，已收集的行仍然保留
    Failed(CrawlError),
}

/// 单个任务的爬取结果
#[derive(Debug)]
pub struct CrawlOutcome {
    /// 按爬取顺序拼接的各页数据行
    pub rows: Vec<IndicatorRow>,
    pub pages_crawled: usize,
    pub stop: StopReason,
}

impl CrawlOutcome {
    /// 任务是否因致命错误提前结束
    pub fn error(&self) -> Option<&CrawlError> {
        match &self.stop {
            StopReason::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// 爬取服务
///
/// 驱动逐页的爬取状态机：
/// `Start → FirstPageLoaded → (SortApplied|SortSkipped) → RowsCollected → RowsValidated
/// → (NextPageAvailable → RowsCollected | Exhausted) | PageBudgetReached | FatalError`。
///
/// 每个任务独占一个新启动的浏览界面，任何退出路径上都会释放它。
pub struct CrawlService<L: SurfaceLauncher> {
    launcher: L,
    options: CrawlOptions,
    validator: RowValidator,
    interceptor: DownloadInterceptor,
    pager: Pager,
}

impl<L: SurfaceLauncher> CrawlService<L> {
    /// 创建新的爬取服务实例
    ///
    /// # 参数
    ///
    /// * `launcher` - 浏览界面启动器
    /// * `options` - 选择器与超时参数
    pub fn new(launcher: L, options: CrawlOptions) -> Self {
        let validator = RowValidator::new(options.cell_selector.clone());
        let interceptor =
            DownloadInterceptor::new(options.download_selector.clone(), options.download_timeout);
        let pager = Pager::new(options.next_selector.clone(), options.navigation_timeout);
        Self {
            launcher,
            options,
            validator,
            interceptor,
            pager,
        }
    }

    /// 爬取一个任务
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlOutcome)` - 爬取结果；任务中途的致命错误记录在 `stop` 中
    /// * `Err(CrawlError::Launch)` - 浏览界面无法启动
    #[instrument(skip(self, request), fields(url = %request.target_url, budget = request.page_budget))]
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlOutcome, CrawlError> {
        let surface = self.launcher.launch().await.map_err(CrawlError::Launch)?;

        let mut rows = Vec::new();
        let mut pages_crawled = 0;
        let stop = self
            .run_pages(&surface, request, &mut rows, &mut pages_crawled)
            .await
            .unwrap_or_else(StopReason::Failed);

        if let Err(e) = surface.close().await {
            warn!("Failed to release browsing surface: {}", e);
        }

        Ok(CrawlOutcome {
            rows,
            pages_crawled,
            stop,
        })
    }

    async fn run_pages<S: BrowsingSurface>(
        &self,
        surface: &S,
        request: &CrawlRequest,
        rows: &mut Vec<IndicatorRow>,
        pages_crawled: &mut usize,
    ) -> Result<StopReason, CrawlError> {
        let mut lingering = None;
        for page_index in 0..request.page_budget {
            info!("Processing page {}/{}", page_index + 1, request.page_budget);

            if page_index == 0 {
                self.load_first_page(surface, request).await?;
            } else {
                let turn = self.pager.advance(surface).await.map_err(|e| {
                    if e.is_timeout() {
                        CrawlError::PageSettle(e)
                    } else {
                        CrawlError::Surface(e)
                    }
                })?;
                if turn == PageTurn::Exhausted {
                    info!("No more pages found. Stopping at page {}", page_index);
                    return Ok(StopReason::Exhausted);
                }
            }

            surface
                .wait_for_selector(&self.options.row_selector, self.options.row_wait_timeout)
                .await
                .map_err(|source| CrawlError::RowsNotVisible {
                    page: page_index + 1,
                    source,
                })?;

            let cycle = self
                .collect_page(surface, page_index, request.capture_downloads, &mut lingering)
                .await?;
            info!(
                "Found {} total rows, validated {}",
                cycle.candidates,
                cycle.validated()
            );
            metrics::counter!("statcrawl_pages_total").increment(1);
            metrics::counter!("statcrawl_rows_candidates_total").increment(cycle.candidates as u64);
            metrics::counter!("statcrawl_rows_validated_total").increment(cycle.validated() as u64);

            rows.extend(cycle.rows);
            *pages_crawled += 1;

            if !self.options.page_delay.is_zero() {
                tokio::time::sleep(self.options.page_delay).await;
            }
        }

        Ok(StopReason::PageBudgetReached)
    }

    async fn load_first_page<S: BrowsingSurface>(
        &self,
        surface: &S,
        request: &CrawlRequest,
    ) -> Result<(), CrawlError> {
        let limit = self.options.navigation_timeout;
        surface
            .navigate(&request.target_url, limit)
            .await
            .map_err(CrawlError::Navigation)?;
        surface
            .wait_for_network_idle(limit)
            .await
            .map_err(CrawlError::Navigation)?;

        if request.sort == SortPreference::Similarity {
            if let Err(e) = self.apply_similarity_sort(surface).await {
                warn!("Error applying similarity sort, keeping default order: {}", e);
            }
        }
        Ok(())
    }

    async fn apply_similarity_sort<S: BrowsingSurface>(&self, surface: &S) -> Result<(), SurfaceError> {
        let Some(control) = surface.query(&self.options.sort_selector).await? else {
            info!("Similarity sort control not found, keeping default order");
            return Ok(());
        };
        info!("Applying similarity sort");
        control.click().await?;
        surface
            .wait_for_network_idle(self.options.navigation_timeout)
            .await
    }

    async fn collect_page<S: BrowsingSurface>(
        &self,
        surface: &S,
        page_index: usize,
        capture_downloads: bool,
        lingering: &mut Option<S::Watch>,
    ) -> Result<PageCycleResult, CrawlError> {
        let candidates = surface.query_all(&self.options.row_selector).await?;
        let mut cycle = PageCycleResult::new(page_index, candidates.len());

        for handle in &candidates {
            let row = match self.validator.validate(handle).await {
                Verdict::Accepted(row) => row,
                Verdict::Rejected(reason) => {
                    debug!("Skipping candidate row: {}", reason);
                    continue;
                }
            };

            let row = if capture_downloads {
                let url = self
                    .interceptor
                    .try_capture(surface, handle, row.indicator(), lingering)
                    .await;
                row.with_download_url(url)
            } else {
                row
            };
            cycle.rows.push(row);
        }

        Ok(cycle)
    }
}
