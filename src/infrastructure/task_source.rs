// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task_parameters::TaskParameters;
use crate::utils::errors::TaskSourceError;
use serde_yaml::{Mapping, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 任务文件来源
///
/// 任务文件是一个 YAML 列表，每一项是一个键值映射，对应一次爬取任务。
/// JSON 作为 YAML 的子集同样可以读取。
#[derive(Debug, Clone)]
pub struct TaskFileSource {
    path: PathBuf,
}

impl TaskFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取并解析任务文件
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<TaskParameters>)` - 按文件顺序排列的任务
    /// * `Err(TaskSourceError::NotFound)` - 文件不存在
    /// * `Err(TaskSourceError)` - 读取或解析失败
    pub async fn load(&self) -> Result<Vec<TaskParameters>, TaskSourceError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TaskSourceError::NotFound(self.path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let tasks = parse_tasks(&text)?;
        info!("Loaded {} tasks from {}", tasks.len(), self.path.display());
        Ok(tasks)
    }
}

/// 解析任务文件内容
///
/// 标量值统一转为字符串，`null` 视为空值；所有值都为空的条目被跳过。
pub fn parse_tasks(text: &str) -> Result<Vec<TaskParameters>, TaskSourceError> {
    let entries = match serde_yaml::from_str::<Value>(text)? {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(entries) => entries,
        _ => {
            return Err(TaskSourceError::InvalidTask {
                row: 0,
                reason: "top level must be a list of tasks".to_string(),
            })
        }
    };

    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let row = index + 1;
        let Value::Mapping(mapping) = entry else {
            return Err(TaskSourceError::InvalidTask {
                row,
                reason: "task must be a mapping".to_string(),
            });
        };

        let task = to_parameters(row, mapping)?;
        if task.cleaned().is_empty() {
            debug!("Skipping blank task entry {}", row);
            continue;
        }
        tasks.push(task);
    }
    Ok(tasks)
}

fn to_parameters(row: usize, mapping: Mapping) -> Result<TaskParameters, TaskSourceError> {
    let mut params = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = scalar_text(key).ok_or_else(|| TaskSourceError::InvalidTask {
            row,
            reason: "keys must be scalars".to_string(),
        })?;
        let value = scalar_text(value).ok_or_else(|| TaskSourceError::InvalidTask {
            row,
            reason: format!("value of `{}` must be a scalar", key),
        })?;
        params.push((key, value));
    }
    Ok(TaskParameters::new(params))
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s),
        Value::Tagged(tagged) => scalar_text(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
