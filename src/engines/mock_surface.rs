// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 测试用的内存浏览界面
//!
//! 按选择器字符串模拟一个分页表格站点，并记录所有交互，
//! 供爬取状态机的单元测试断言。

use crate::engines::traits::{
    BoundingBox, BrowsingSurface, DownloadWatch, ElementHandle, StartedDownload, SurfaceError,
    SurfaceLauncher,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub mod sel {
    pub const ROW: &str = "tbody > tr";
    pub const CELL: &str = "td";
    pub const NEXT: &str = ".btn-next";
    pub const SORT: &str = ".sort-similar";
    pub const DOWNLOAD: &str = ".excel";
}

/// 点击下载按钮后的表现
#[derive(Debug, Clone)]
pub enum MockDownload {
    /// 立即开始下载
    Fires(String),
    /// 永远不触发下载事件
    Never,
    /// 等待超时之后才开始下载
    Late(String),
    /// 点击本身失败
    ClickFails,
}

#[derive(Debug, Clone)]
pub struct MockRow {
    pub cells: Vec<String>,
    pub height: Option<f64>,
    pub download: Option<MockDownload>,
}

impl MockRow {
    pub fn data(cells: &[&str]) -> Self {
        Self {
            cells: cells.iter().map(|c| c.to_string()).collect(),
            height: Some(24.0),
            download: None,
        }
    }

    pub fn indicator(name: &str) -> Self {
        Self::data(&["", "2023", "全国", name, "1", "亿元", "统计年鉴", "1"])
    }

    pub fn hidden(mut self) -> Self {
        self.height = None;
        self
    }

    pub fn zero_height(mut self) -> Self {
        self.height = Some(0.0);
        self
    }

    pub fn with_download(mut self, download: MockDownload) -> Self {
        self.download = Some(download);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub rows: Vec<MockRow>,
    /// `None` 表示页面上没有下一页按钮
    pub next_enabled: Option<bool>,
}

impl MockPage {
    pub fn new(rows: Vec<MockRow>, next_enabled: Option<bool>) -> Self {
        Self { rows, next_enabled }
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub pages: Vec<MockPage>,
    pub current: usize,
    pub sort_control: bool,
    pub sort_clicks: usize,
    pub fail_sort_click: bool,
    pub fail_settle_after_sort: bool,
    pub visited: Vec<String>,
    pub idle_waits: usize,
    pub launches: usize,
    pub closed: bool,
    pub fail_launch: bool,
    pub fail_navigation: bool,
    pub fail_rows_on_page: Option<usize>,
    pub fail_settle_after_advance: bool,
    pub pending_downloads: VecDeque<StartedDownload>,
    pub late_download: Option<String>,
    pub started_downloads: Vec<String>,
    pub cancelled_downloads: Vec<String>,
    next_download_id: usize,
}

impl MockState {
    fn start_download(&mut self, url: &str) {
        self.next_download_id += 1;
        let id = format!("dl-{}", self.next_download_id);
        self.started_downloads.push(id.clone());
        self.pending_downloads.push_back(StartedDownload {
            id,
            url: url.to_string(),
            suggested_filename: "data.xls".to_string(),
        });
    }
}

pub type Shared = Arc<Mutex<MockState>>;

pub fn shared(pages: Vec<MockPage>) -> Shared {
    Arc::new(Mutex::new(MockState {
        pages,
        ..Default::default()
    }))
}

#[derive(Debug, Clone)]
pub enum MockElement {
    Row { row: MockRow, state: Shared },
    Cell(String),
    Next { enabled: bool, state: Shared },
    Sort { state: Shared },
    Download { outcome: MockDownload, state: Shared },
}

impl MockElement {
    /// 脱离页面状态的独立行，用于校验器测试
    pub fn row(row: MockRow) -> Self {
        MockElement::Row {
            row,
            state: shared(Vec::new()),
        }
    }
}

#[async_trait]
impl ElementHandle for MockElement {
    async fn bounding_box(&self) -> Result<Option<BoundingBox>, SurfaceError> {
        let height = match self {
            MockElement::Row { row, .. } => row.height,
            _ => Some(20.0),
        };
        Ok(height.map(|height| BoundingBox {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height,
        }))
    }

    async fn query(&self, selector: &str) -> Result<Option<Self>, SurfaceError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, SurfaceError> {
        let MockElement::Row { row, state } = self else {
            return Ok(Vec::new());
        };
        Ok(match selector {
            sel::CELL => row.cells.iter().cloned().map(MockElement::Cell).collect(),
            sel::DOWNLOAD => row
                .download
                .iter()
                .map(|outcome| MockElement::Download {
                    outcome: outcome.clone(),
                    state: state.clone(),
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    async fn inner_text(&self) -> Result<String, SurfaceError> {
        Ok(match self {
            MockElement::Row { row, .. } => row.cells.join("\t"),
            MockElement::Cell(text) => text.clone(),
            _ => String::new(),
        })
    }

    async fn click(&self) -> Result<(), SurfaceError> {
        match self {
            MockElement::Next { enabled, state } => {
                if *enabled {
                    state.lock().current += 1;
                }
            }
            MockElement::Sort { state } => {
                let mut s = state.lock();
                if s.fail_sort_click {
                    return Err(SurfaceError::Protocol("sort control detached".to_string()));
                }
                s.sort_clicks += 1;
            }
            MockElement::Download { outcome, state } => match outcome {
                MockDownload::Fires(url) => state.lock().start_download(url),
                MockDownload::Never => {}
                MockDownload::Late(url) => state.lock().late_download = Some(url.clone()),
                MockDownload::ClickFails => {
                    return Err(SurfaceError::Protocol("element is not clickable".to_string()))
                }
            },
            _ => {}
        }
        Ok(())
    }

    async fn is_enabled(&self) -> Result<bool, SurfaceError> {
        Ok(match self {
            MockElement::Next { enabled, .. } => *enabled,
            _ => true,
        })
    }
}

pub struct MockWatch {
    state: Shared,
}

#[async_trait]
impl DownloadWatch for MockWatch {
    async fn next_download(&mut self, timeout: Duration) -> Result<StartedDownload, SurfaceError> {
        let pending = self.state.lock().pending_downloads.pop_front();
        match pending {
            Some(download) => Ok(download),
            None => {
                tokio::time::sleep(timeout).await;
                // 迟到的下载在监听器超时之后才开始
                let mut s = self.state.lock();
                if let Some(url) = s.late_download.take() {
                    s.start_download(&url);
                }
                Err(SurfaceError::Timeout("download event".to_string()))
            }
        }
    }
}

#[derive(Clone)]
pub struct MockSurface {
    pub state: Shared,
}

#[async_trait]
impl BrowsingSurface for MockSurface {
    type Element = MockElement;
    type Watch = MockWatch;

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), SurfaceError> {
        let mut s = self.state.lock();
        if s.fail_navigation {
            return Err(SurfaceError::Timeout(format!("navigation to {}", url)));
        }
        s.visited.push(url.to_string());
        s.current = 0;
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<(), SurfaceError> {
        let mut s = self.state.lock();
        s.idle_waits += 1;
        if s.fail_settle_after_advance && s.current > 0 {
            return Err(SurfaceError::Timeout("network idle".to_string()));
        }
        if s.fail_settle_after_sort && s.sort_clicks > 0 {
            s.fail_settle_after_sort = false;
            return Err(SurfaceError::Timeout("network idle".to_string()));
        }
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), SurfaceError> {
        let s = self.state.lock();
        let has_rows = s
            .pages
            .get(s.current)
            .is_some_and(|p| !p.rows.is_empty());
        if selector != sel::ROW || s.fail_rows_on_page == Some(s.current) || !has_rows {
            return Err(SurfaceError::Timeout(format!("selector `{}`", selector)));
        }
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Option<MockElement>, SurfaceError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<MockElement>, SurfaceError> {
        let s = self.state.lock();
        let page = s.pages.get(s.current).cloned().unwrap_or_default();
        Ok(match selector {
            sel::ROW => page
                .rows
                .into_iter()
                .map(|row| MockElement::Row {
                    row,
                    state: self.state.clone(),
                })
                .collect(),
            sel::NEXT => page
                .next_enabled
                .map(|enabled| MockElement::Next {
                    enabled,
                    state: self.state.clone(),
                })
                .into_iter()
                .collect(),
            sel::SORT if s.sort_control => vec![MockElement::Sort {
                state: self.state.clone(),
            }],
            _ => Vec::new(),
        })
    }

    async fn arm_download(&self) -> Result<MockWatch, SurfaceError> {
        Ok(MockWatch {
            state: self.state.clone(),
        })
    }

    async fn cancel_download(&self, download: &StartedDownload) -> Result<(), SurfaceError> {
        self.state
            .lock()
            .cancelled_downloads
            .push(download.id.clone());
        Ok(())
    }

    async fn close(self) -> Result<(), SurfaceError> {
        self.state.lock().closed = true;
        Ok(())
    }
}

pub struct MockLauncher {
    pub state: Shared,
}

#[async_trait]
impl SurfaceLauncher for MockLauncher {
    type Surface = MockSurface;

    async fn launch(&self) -> Result<MockSurface, SurfaceError> {
        let mut s = self.state.lock();
        s.launches += 1;
        if s.fail_launch {
            return Err(SurfaceError::Launch("no browser available".to_string()));
        }
        s.closed = false;
        Ok(MockSurface {
            state: self.state.clone(),
        })
    }
}
