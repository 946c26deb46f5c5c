// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 结果排序偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPreference {
    /// 站点默认排序
    #[default]
    Default,
    /// 按相关度排序
    Similarity,
}

impl fmt::Display for SortPreference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortPreference::Default => write!(f, "default"),
            SortPreference::Similarity => write!(f, "similarity"),
        }
    }
}

impl FromStr for SortPreference {
    type Err = std::convert::Infallible;

    /// 任何无法识别的取值都按默认排序处理
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "相关度" || s.eq_ignore_ascii_case("similarity") {
            Ok(SortPreference::Similarity)
        } else {
            Ok(SortPreference::Default)
        }
    }
}

/// 单个爬取任务的查询参数
///
/// 参数顺序与任务文件中的列顺序一致。核心爬取逻辑只读取这里的数据。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskParameters {
    params: Vec<(String, String)>,
}

impl TaskParameters {
    pub fn new(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    /// 按键读取参数
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 按键读取参数，空白值视为缺失
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// 去掉空白值后的参数，保持原有顺序
    pub fn cleaned(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// 任务的指标名称，用于日志
    pub fn indicator_label(&self) -> &str {
        self.get_non_blank("indicateName").unwrap_or("N/A")
    }

    /// 任务的排序偏好
    pub fn sort_preference(&self) -> SortPreference {
        self.get("sort")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// 与数据行一同持久化的任务元数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMeta {
    pub zcode: Option<String>,
    pub indicate_name: Option<String>,
    pub search_mode_one: Option<i32>,
    pub area: Option<String>,
    pub begin_year: Option<i32>,
    pub end_year: Option<i32>,
    pub data_type: Option<String>,
}

// 尽力而为：只有纯数字才转成整数，其他取值一律记为缺失
fn digit_like(value: Option<&str>) -> Option<i32> {
    let v = value?.trim();
    if !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()) {
        v.parse().ok()
    } else {
        None
    }
}

impl TaskMeta {
    pub fn from_parameters(params: &TaskParameters) -> Self {
        let text = |key: &str| params.get_non_blank(key).map(str::to_string);
        Self {
            zcode: text("zcode"),
            indicate_name: text("indicateName"),
            search_mode_one: digit_like(params.get("searchModeOne")),
            area: text("area"),
            begin_year: digit_like(params.get("beginYear")),
            end_year: digit_like(params.get("endYear")),
            data_type: text("dataType"),
        }
    }
}
