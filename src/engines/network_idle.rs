// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::SurfaceError;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 网络活动状态
#[derive(Debug)]
pub(crate) struct NetworkActivity {
    inflight: Mutex<HashSet<String>>,
    last_activity: Mutex<Instant>,
}

impl NetworkActivity {
    pub(crate) fn new() -> Self {
        Self {
            inflight: Mutex::new(HashSet::new()),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn request_started(&self, request_id: &str) {
        self.inflight.lock().insert(request_id.to_string());
        *self.last_activity.lock() = Instant::now();
    }

    pub(crate) fn request_done(&self, request_id: &str) {
        self.inflight.lock().remove(request_id);
        *self.last_activity.lock() = Instant::now();
    }

    fn snapshot(&self) -> (usize, Instant) {
        (self.inflight.lock().len(), *self.last_activity.lock())
    }

    /// 等待网络静默
    ///
    /// 没有进行中的请求，并且距离最后一次网络活动（或本次等待开始）
    /// 至少经过 `quiet` 时才算静默。
    pub(crate) async fn wait_for_idle(
        &self,
        quiet: Duration,
        limit: Duration,
    ) -> Result<(), SurfaceError> {
        let armed_at = Instant::now();
        timeout(limit, async {
            loop {
                let (inflight, last) = self.snapshot();
                let since = last.max(armed_at);
                if inflight == 0 && since.elapsed() >= quiet {
                    return;
                }
                sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| SurfaceError::Timeout("network idle".to_string()))
    }
}

/// 网络静默跟踪器
///
/// 订阅页面的 `Network.requestWillBeSent` / `loadingFinished` / `loadingFailed`
/// 事件并维护进行中的请求集合。
pub struct NetworkIdleTracker {
    activity: Arc<NetworkActivity>,
    quiet: Duration,
    listener: JoinHandle<()>,
}

impl NetworkIdleTracker {
    /// 在页面上启动跟踪
    ///
    /// # 参数
    ///
    /// * `page` - 目标页面
    /// * `quiet` - 判定静默所需的无活动窗口
    pub async fn attach(page: &Page, quiet: Duration) -> Result<Self, SurfaceError> {
        page.execute(EnableParams::default())
            .await
            .map_err(|e| SurfaceError::Protocol(e.to_string()))?;

        let mut sent = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| SurfaceError::Protocol(e.to_string()))?;
        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| SurfaceError::Protocol(e.to_string()))?;
        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(|e| SurfaceError::Protocol(e.to_string()))?;

        let activity = Arc::new(NetworkActivity::new());
        let tracked = activity.clone();
        let listener = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = sent.next() => {
                        tracked.request_started(event.request_id.inner());
                    }
                    Some(event) = finished.next() => {
                        tracked.request_done(event.request_id.inner());
                    }
                    Some(event) = failed.next() => {
                        tracked.request_done(event.request_id.inner());
                    }
                    else => break,
                }
            }
            tracing::trace!("Network listener stopped");
        });

        Ok(Self {
            activity,
            quiet,
            listener,
        })
    }

    /// 等待网络静默，超过 `limit` 返回超时错误
    pub async fn wait_for_idle(&self, limit: Duration) -> Result<(), SurfaceError> {
        self.activity.wait_for_idle(self.quiet, limit).await
    }
}

impl Drop for NetworkIdleTracker {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
