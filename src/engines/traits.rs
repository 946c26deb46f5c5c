// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 浏览界面错误类型
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// 浏览器启动或连接失败
    #[error("Browser launch failed: {0}")]
    Launch(String),
    /// 导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 有界等待超时
    #[error("Timed out waiting for {0}")]
    Timeout(String),
    /// DevTools 协议错误
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// 本地 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SurfaceError {
    /// 判断错误是否为超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, SurfaceError::Timeout(_))
    }
}

/// 元素的渲染几何信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// 由页面控件触发、已开始但尚未完成的下载
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedDownload {
    /// 下载标识（CDP guid）
    pub id: String,
    /// 下载源地址
    pub url: String,
    /// 浏览器建议的文件名
    pub suggested_filename: String,
}

/// 页面元素句柄
#[async_trait]
pub trait ElementHandle: Send + Sync + Sized {
    /// 获取元素的渲染包围盒，没有几何信息时返回 `None`
    async fn bounding_box(&self) -> Result<Option<BoundingBox>, SurfaceError>;

    /// 在元素范围内查找第一个匹配的子元素
    async fn query(&self, selector: &str) -> Result<Option<Self>, SurfaceError>;

    /// 在元素范围内查找全部匹配的子元素，保持 DOM 顺序
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, SurfaceError>;

    /// 元素的渲染文本
    async fn inner_text(&self) -> Result<String, SurfaceError>;

    /// 点击元素
    async fn click(&self) -> Result<(), SurfaceError>;

    /// 元素是否处于可用状态
    async fn is_enabled(&self) -> Result<bool, SurfaceError>;
}

/// 已布置的下载事件监听器
#[async_trait]
pub trait DownloadWatch: Send {
    /// 等待下一个下载开始，超过 `timeout` 返回 [`SurfaceError::Timeout`]
    async fn next_download(&mut self, timeout: Duration) -> Result<StartedDownload, SurfaceError>;
}

/// 可脚本化的浏览界面
///
/// 爬取核心只通过这组能力访问渲染引擎，选择器和几何判断都建立在它之上，
/// 因此渲染引擎可以替换（Chromium、测试桩等）。
#[async_trait]
pub trait BrowsingSurface: Send + Sync + Sized {
    /// 元素句柄类型
    type Element: ElementHandle;
    /// 下载监听器类型
    type Watch: DownloadWatch;

    /// 导航到指定 URL，超过 `timeout` 视为失败
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SurfaceError>;

    /// 等待网络静默
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), SurfaceError>;

    /// 等待至少一个匹配元素出现
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<(), SurfaceError>;

    /// 查找第一个匹配的元素
    async fn query(&self, selector: &str) -> Result<Option<Self::Element>, SurfaceError>;

    /// 查找全部匹配的元素，保持 DOM 顺序
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, SurfaceError>;

    /// 布置下载监听器，必须在触发下载之前调用
    async fn arm_download(&self) -> Result<Self::Watch, SurfaceError>;

    /// 取消正在进行的下载并丢弃其内容
    async fn cancel_download(&self, download: &StartedDownload) -> Result<(), SurfaceError>;

    /// 释放浏览界面
    async fn close(self) -> Result<(), SurfaceError>;
}

/// 浏览界面启动器
///
/// 每个任务通过它获得一个全新、隔离的浏览界面。
#[async_trait]
pub trait SurfaceLauncher: Send + Sync {
    /// 启动得到的浏览界面类型
    type Surface: BrowsingSurface;

    /// 启动新的浏览界面
    async fn launch(&self) -> Result<Self::Surface, SurfaceError>;
}
