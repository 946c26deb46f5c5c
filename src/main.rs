// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use statcrawl::application::use_cases::batch_crawl::{BatchCrawlUseCase, BatchOptions};
use statcrawl::config::settings::Settings;
use statcrawl::domain::repositories::indicator_repository::IndicatorRepository;
use statcrawl::domain::services::crawl_service::{CrawlOptions, CrawlService};
use statcrawl::engines::chromium_engine::ChromiumLauncher;
use statcrawl::infrastructure::database::connection;
use statcrawl::infrastructure::repositories::indicator_repo_impl::IndicatorRepositoryImpl;
use statcrawl::infrastructure::task_source::TaskFileSource;
use statcrawl::utils::errors::TaskSourceError;
use statcrawl::utils::telemetry;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 主函数
///
/// 加载配置和任务文件，逐个执行爬取任务并把结果写入数据库
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting statcrawl...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        statcrawl::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr)?;
    }

    // 3. Connect to database and prepare schema
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    let repository = Arc::new(IndicatorRepositoryImpl::new(db));
    repository.init_schema().await?;
    info!("Database ready at {}", settings.database.url);

    // 4. Load tasks
    let source = TaskFileSource::new(&settings.crawler.tasks_file);
    let tasks = match source.load().await {
        Ok(tasks) => tasks,
        Err(TaskSourceError::NotFound(path)) => {
            error!(
                "The tasks file '{}' was not found. Please create it and define your tasks.",
                path
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // 5. Run the batch
    let crawl_service = CrawlService::new(
        ChromiumLauncher::new(settings.browser.clone()),
        CrawlOptions::from_settings(&settings.crawler, &settings.selectors),
    );
    let batch = BatchCrawlUseCase::new(
        crawl_service,
        repository.clone(),
        BatchOptions::from_settings(&settings.crawler),
    );
    let summary = batch.run(&tasks).await;

    // 6. Report
    let stored = match repository.count().await {
        Ok(total) => total.to_string(),
        Err(e) => {
            warn!("Failed to count stored rows: {}", e);
            "unknown".to_string()
        }
    };
    info!(
        "Batch finished: {}/{} tasks succeeded, {} rows parsed, {} new rows stored ({} total)",
        summary.tasks_total - summary.tasks_failed,
        summary.tasks_total,
        summary.rows_parsed,
        summary.rows_inserted,
        stored
    );
    Ok(())
}
