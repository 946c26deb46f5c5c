// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：指标数据行、任务参数和元数据
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：行校验、下载拦截、翻页和爬取状态机
///
/// 领域层不依赖于任何具体的浏览器或数据库实现。
pub mod models;
pub mod repositories;
pub mod services;
