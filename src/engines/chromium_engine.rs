// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::network_idle::NetworkIdleTracker;
use crate::engines::traits::{
    BoundingBox, BrowsingSurface, DownloadWatch, ElementHandle, StartedDownload, SurfaceError,
    SurfaceLauncher,
};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    CancelDownloadParams, EventDownloadWillBegin, SetDownloadBehaviorBehavior,
    SetDownloadBehaviorParams,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn protocol_err(e: impl std::fmt::Display) -> SurfaceError {
    SurfaceError::Protocol(e.to_string())
}

/// 轮询直到 `check` 返回 `true` 或超过 `limit`
///
/// 翻页时文档节点会被替换，期间的协议错误只当作"尚未出现"，继续重试。
async fn poll_until<F, Fut>(what: &str, limit: Duration, mut check: F) -> Result<(), SurfaceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, SurfaceError>>,
{
    let deadline = Instant::now() + limit;
    let mut last_error = None;
    loop {
        match check().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                tracing::trace!("Check for {} failed, retrying: {}", what, e);
                last_error = Some(e);
            }
        }
        if Instant::now() >= deadline {
            if let Some(e) = last_error {
                tracing::debug!("Last error while waiting for {}: {}", what, e);
            }
            return Err(SurfaceError::Timeout(what.to_string()));
        }
        sleep(SELECTOR_POLL_INTERVAL).await;
    }
}

/// Chromium 启动器
///
/// 每次 [`SurfaceLauncher::launch`] 都会启动一个全新的浏览器进程，
/// 配置了远程调试地址时则连接到该实例并打开新页面。
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    async fn start_browser(&self) -> Result<(Browser, chromiumoxide::Handler, bool), SurfaceError> {
        if let Some(url) = &self.settings.remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            let (browser, handler) = Browser::connect(url)
                .await
                .map_err(|e| SurfaceError::Launch(format!("Failed to connect to remote Chrome: {}", e)))?;
            return Ok((browser, handler, false));
        }

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(self.settings.request_timeout_secs))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !self.settings.headless {
            builder = builder.with_head();
        }

        let config = builder.build().map_err(SurfaceError::Launch)?;
        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| SurfaceError::Launch(e.to_string()))?;
        Ok((browser, handler, true))
    }
}

#[async_trait]
impl SurfaceLauncher for ChromiumLauncher {
    type Surface = ChromiumSurface;

    async fn launch(&self) -> Result<ChromiumSurface, SurfaceError> {
        let (mut browser, mut handler, owns_browser) = self.start_browser().await?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        match ChromiumSurface::open(&browser, self.settings.network_quiet_ms).await {
            Ok(parts) => Ok(ChromiumSurface {
                browser,
                page: parts.0,
                network: parts.1,
                download_dir: parts.2,
                handler: handler_task,
                owns_browser,
            }),
            Err(e) => {
                if owns_browser {
                    let _ = browser.close().await;
                    let _ = browser.wait().await;
                }
                handler_task.abort();
                Err(e)
            }
        }
    }
}

/// 基于 chromiumoxide 的浏览界面
pub struct ChromiumSurface {
    browser: Browser,
    page: Page,
    network: NetworkIdleTracker,
    // 下载只落在这个临时目录里，界面关闭时整体删除
    download_dir: TempDir,
    handler: JoinHandle<()>,
    owns_browser: bool,
}

impl ChromiumSurface {
    async fn open(
        browser: &Browser,
        network_quiet_ms: u64,
    ) -> Result<(Page, NetworkIdleTracker, TempDir), SurfaceError> {
        let page = browser.new_page("about:blank").await.map_err(protocol_err)?;
        let network =
            NetworkIdleTracker::attach(&page, Duration::from_millis(network_quiet_ms)).await?;

        let download_dir = tempfile::Builder::new().prefix("statcrawl-dl-").tempdir()?;
        let mut behavior = SetDownloadBehaviorParams::new(SetDownloadBehaviorBehavior::Allow);
        behavior.download_path = Some(download_dir.path().to_string_lossy().into_owned());
        behavior.events_enabled = Some(true);
        browser.execute(behavior).await.map_err(protocol_err)?;

        Ok((page, network, download_dir))
    }
}

#[async_trait]
impl BrowsingSurface for ChromiumSurface {
    type Element = ChromiumElement;
    type Watch = ChromiumDownloadWatch;

    async fn navigate(&self, url: &str, limit: Duration) -> Result<(), SurfaceError> {
        timeout(limit, self.page.goto(url))
            .await
            .map_err(|_| SurfaceError::Timeout(format!("navigation to {}", url)))?
            .map_err(|e| SurfaceError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_network_idle(&self, limit: Duration) -> Result<(), SurfaceError> {
        self.network.wait_for_idle(limit).await
    }

    async fn wait_for_selector(&self, selector: &str, limit: Duration) -> Result<(), SurfaceError> {
        let what = format!("selector `{}`", selector);
        poll_until(&what, limit, || async {
            Ok::<_, SurfaceError>(!self.query_all(selector).await?.is_empty())
        })
        .await
    }

    async fn query(&self, selector: &str) -> Result<Option<ChromiumElement>, SurfaceError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ChromiumElement>, SurfaceError> {
        let elements = self.page.find_elements(selector).await.map_err(protocol_err)?;
        Ok(elements.into_iter().map(ChromiumElement).collect())
    }

    async fn arm_download(&self) -> Result<ChromiumDownloadWatch, SurfaceError> {
        let events = self
            .browser
            .event_listener::<EventDownloadWillBegin>()
            .await
            .map_err(protocol_err)?;
        Ok(ChromiumDownloadWatch { events })
    }

    async fn cancel_download(&self, download: &StartedDownload) -> Result<(), SurfaceError> {
        self.browser
            .execute(CancelDownloadParams::new(download.id.clone()))
            .await
            .map_err(protocol_err)?;
        Ok(())
    }

    async fn close(self) -> Result<(), SurfaceError> {
        let ChromiumSurface {
            mut browser,
            page,
            network,
            download_dir,
            handler,
            owns_browser,
        } = self;

        drop(network);
        let page_result = page.close().await.map_err(protocol_err);

        if owns_browser {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("Failed to wait for browser exit: {}", e);
            }
        }
        handler.abort();

        download_dir.close()?;
        page_result
    }
}

/// Chromium 页面元素
pub struct ChromiumElement(Element);

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn bounding_box(&self) -> Result<Option<BoundingBox>, SurfaceError> {
        // 隐藏或已脱离文档的节点没有 box model，CDP 直接报错
        match self.0.bounding_box().await {
            Ok(b) => Ok(Some(BoundingBox {
                x: b.x,
                y: b.y,
                width: b.width,
                height: b.height,
            })),
            Err(e) => {
                tracing::trace!("No box model for element: {}", e);
                Ok(None)
            }
        }
    }

    async fn query(&self, selector: &str) -> Result<Option<Self>, SurfaceError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, SurfaceError> {
        let elements = self.0.find_elements(selector).await.map_err(protocol_err)?;
        Ok(elements.into_iter().map(ChromiumElement).collect())
    }

    async fn inner_text(&self) -> Result<String, SurfaceError> {
        Ok(self.0.inner_text().await.map_err(protocol_err)?.unwrap_or_default())
    }

    async fn click(&self) -> Result<(), SurfaceError> {
        self.0.click().await.map_err(protocol_err)?;
        Ok(())
    }

    async fn is_enabled(&self) -> Result<bool, SurfaceError> {
        if self.0.attribute("disabled").await.map_err(protocol_err)?.is_some() {
            return Ok(false);
        }
        let aria = self.0.attribute("aria-disabled").await.map_err(protocol_err)?;
        Ok(aria.as_deref() != Some("true"))
    }
}

/// `Browser.downloadWillBegin` 事件监听器
pub struct ChromiumDownloadWatch {
    events: EventStream<EventDownloadWillBegin>,
}

#[async_trait]
impl DownloadWatch for ChromiumDownloadWatch {
    async fn next_download(&mut self, limit: Duration) -> Result<StartedDownload, SurfaceError> {
        let event = timeout(limit, self.events.next())
            .await
            .map_err(|_| SurfaceError::Timeout("download event".to_string()))?
            .ok_or_else(|| SurfaceError::Protocol("download event stream closed".to_string()))?;

        Ok(StartedDownload {
            id: event.guid.clone(),
            url: event.url.clone(),
            suggested_filename: event.suggested_filename.clone(),
        })
    }
}
