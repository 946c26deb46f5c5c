// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 爬取服务（crawl_service）：逐页爬取的状态机
/// - 行校验（row_validator）：过滤渲染噪声并提取字段
/// - 下载拦截（download_interceptor）：记录下载地址后取消传输
/// - 翻页（pager）：检测并点击下一页按钮
pub mod crawl_service;
pub mod download_interceptor;
pub mod pager;
pub mod row_validator;
