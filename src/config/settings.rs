// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、浏览器、爬取流程、页面选择器和指标导出等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 爬取流程配置
    pub crawler: CrawlerSettings,
    /// 页面选择器配置
    pub selectors: SelectorSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 是否以无头模式启动
    pub headless: bool,
    /// 远程调试地址，配置后连接已有实例而不是启动新进程
    pub remote_debugging_url: Option<String>,
    /// CDP 请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 判定网络静默所需的安静时长（毫秒）
    pub network_quiet_ms: u64,
}

/// 爬取流程配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 检索页基础地址
    pub base_url: String,
    /// 每个任务最多遍历的页数
    pub max_pages: usize,
    /// 是否捕获每行的下载地址
    pub capture_downloads: bool,
    /// 批量爬取前是否清空结果表
    pub clear_before_crawl: bool,
    /// 任务文件路径
    pub tasks_file: String,
    pub navigation_timeout_ms: u64,
    pub row_wait_timeout_ms: u64,
    pub download_timeout_ms: u64,
    /// 两页之间的固定间隔（毫秒）
    pub page_delay_ms: u64,
}

/// 页面选择器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorSettings {
    pub row: String,
    pub cell: String,
    pub next_page: String,
    pub similarity_sort: String,
    pub download_trigger: String,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出端点
    pub enabled: bool,
    /// 导出端点监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `STATCRAWL__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("STATCRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 只包含内置默认值的配置
    pub fn defaults_only() -> Result<Self, ConfigError> {
        Self::defaults(Config::builder())?.build()?.try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Database
            .set_default("database.url", "sqlite://crawler_results.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Browser
            .set_default("browser.headless", true)?
            .set_default("browser.request_timeout_secs", 30)?
            .set_default("browser.network_quiet_ms", 500)?
            // Crawler
            .set_default("crawler.base_url", "https://data.cnki.net/trade/valueSearch/index")?
            .set_default("crawler.max_pages", 5)?
            .set_default("crawler.capture_downloads", false)?
            .set_default("crawler.clear_before_crawl", false)?
            .set_default("crawler.tasks_file", "tasks.yaml")?
            .set_default("crawler.navigation_timeout_ms", 30_000)?
            .set_default("crawler.row_wait_timeout_ms", 10_000)?
            .set_default("crawler.download_timeout_ms", 5_000)?
            .set_default("crawler.page_delay_ms", 1_000)?
            // Selectors
            .set_default("selectors.row", "tbody > tr")?
            .set_default("selectors.cell", "td")?
            .set_default("selectors.next_page", ".btn-next")?
            .set_default("selectors.similarity_sort", ".valueSearch_similar__2TkeM")?
            .set_default("selectors.download_trigger", ".valueSearch_excel__3GKnk")?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}
