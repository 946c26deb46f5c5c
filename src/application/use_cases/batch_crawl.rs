// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::CrawlerSettings;
use crate::domain::models::task_parameters::{TaskMeta, TaskParameters};
use crate::domain::repositories::indicator_repository::IndicatorRepository;
use crate::domain::services::crawl_service::{CrawlRequest, CrawlService};
use crate::engines::traits::SurfaceLauncher;
use crate::utils::url_utils::build_target_url;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// 批量爬取参数
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub base_url: String,
    pub max_pages: usize,
    pub capture_downloads: bool,
    pub clear_before_crawl: bool,
}

impl BatchOptions {
    pub fn from_settings(crawler: &CrawlerSettings) -> Self {
        Self {
            base_url: crawler.base_url.clone(),
            max_pages: crawler.max_pages,
            capture_downloads: crawler.capture_downloads,
            clear_before_crawl: crawler.clear_before_crawl,
        }
    }
}

/// 批量爬取汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub tasks_total: usize,
    pub tasks_failed: usize,
    pub rows_parsed: usize,
    pub rows_inserted: u64,
}

/// 批量爬取用例
///
/// 严格按顺序执行任务。单个任务的任何失败只记录日志，批次继续执行；
/// 失败任务已经收集到的行同样会被保存。
pub struct BatchCrawlUseCase<L: SurfaceLauncher, R: IndicatorRepository> {
    crawl_service: CrawlService<L>,
    repository: Arc<R>,
    options: BatchOptions,
}

impl<L, R> BatchCrawlUseCase<L, R>
where
    L: SurfaceLauncher,
    R: IndicatorRepository,
{
    pub fn new(crawl_service: CrawlService<L>, repository: Arc<R>, options: BatchOptions) -> Self {
        Self {
            crawl_service,
            repository,
            options,
        }
    }

    /// 执行一批任务
    ///
    /// # 参数
    ///
    /// * `tasks` - 按执行顺序排列的任务
    ///
    /// # 返回值
    ///
    /// 批次汇总。任何错误（包括开始前清空结果表失败）都只记录日志，不会中断批次。
    pub async fn run(&self, tasks: &[TaskParameters]) -> BatchSummary {
        let span = info_span!("batch", run_id = %Uuid::new_v4(), tasks = tasks.len());
        self.run_inner(tasks).instrument(span).await
    }

    async fn run_inner(&self, tasks: &[TaskParameters]) -> BatchSummary {
        if self.options.clear_before_crawl {
            match self.repository.clear_all().await {
                Ok(removed) => info!("Cleared {} stored rows before crawling", removed),
                Err(e) => error!("Failed to clear stored rows, continuing with existing data: {}", e),
            }
        }

        let mut summary = BatchSummary {
            tasks_total: tasks.len(),
            ..Default::default()
        };

        for (index, params) in tasks.iter().enumerate() {
            let span = info_span!("task", index = index + 1, indicator = params.indicator_label());
            let succeeded = self
                .run_task(index, tasks.len(), params, &mut summary)
                .instrument(span)
                .await;
            if !succeeded {
                summary.tasks_failed += 1;
                metrics::counter!("statcrawl_tasks_failed_total").increment(1);
            }
        }

        info!(
            "All tasks completed: {} tasks, {} failed, {} rows parsed, {} rows inserted",
            summary.tasks_total, summary.tasks_failed, summary.rows_parsed, summary.rows_inserted
        );
        summary
    }

    /// 执行单个任务，返回任务是否完整成功
    async fn run_task(
        &self,
        index: usize,
        total: usize,
        params: &TaskParameters,
        summary: &mut BatchSummary,
    ) -> bool {
        let label = params.indicator_label();
        info!(
            "[Task {}/{}] Starting task for indicator: {} in {}",
            index + 1,
            total,
            label,
            params.get_non_blank("area").unwrap_or("N/A")
        );

        let url = match build_target_url(&self.options.base_url, params) {
            Ok(url) => url,
            Err(e) => {
                error!("[Task {}] Cannot build URL for '{}': {}", index + 1, label, e);
                return false;
            }
        };
        info!("URL: {}", url);

        let request = CrawlRequest {
            target_url: url.to_string(),
            page_budget: self.options.max_pages,
            capture_downloads: self.options.capture_downloads,
            sort: params.sort_preference(),
        };

        let outcome = match self.crawl_service.crawl(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[Task {}] An error occurred for '{}': {}", index + 1, label, e);
                return false;
            }
        };

        let mut succeeded = true;
        if let Some(e) = outcome.error() {
            error!(
                "[Task {}] An error occurred for '{}' after {} pages: {}",
                index + 1,
                label,
                outcome.pages_crawled,
                e
            );
            succeeded = false;
        }

        summary.rows_parsed += outcome.rows.len();
        info!("Parsed {} records for this task", outcome.rows.len());
        if outcome.rows.is_empty() {
            return succeeded;
        }

        let meta = TaskMeta::from_parameters(params);
        match self.repository.save_all(outcome.rows, &meta).await {
            Ok(inserted) => {
                summary.rows_inserted += inserted;
                metrics::counter!("statcrawl_rows_inserted_total").increment(inserted);
                info!("Saved {} new rows for '{}'", inserted, label);
            }
            Err(e) => {
                warn!("[Task {}] Failed to save rows for '{}': {}", index + 1, label, e);
                succeeded = false;
            }
        }
        succeeded
    }
}
