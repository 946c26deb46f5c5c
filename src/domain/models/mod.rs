// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 指标数据行（indicator_row）：通过校验的表格行及单页处理结果
/// - 任务参数（task_parameters）：任务查询参数、排序偏好和持久化元数据
pub mod indicator_row;
pub mod task_parameters;
