// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

/// 规范化单元格文本：连续空白折叠为单个空格并去掉首尾空白
///
/// 该操作是幂等的。
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 从表格行读取到的原始字段
///
/// 列位置固定：第 1 列到第 7 列依次为时间、地区、指标、数值、单位、来源、页码，
/// 第 0 列不使用。
#[derive(Debug, Clone, Default)]
pub struct RowFields {
    pub time: String,
    pub region: String,
    pub indicator: String,
    pub value: String,
    pub unit: String,
    pub source: String,
    pub page_no: String,
}

/// 指标数据行
///
/// 一条通过校验并完成提取的数据记录。指标名称总是非空的，
/// 不满足条件的行在校验阶段就被丢弃，不会构造出来。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorRow {
    time: String,
    region: String,
    indicator: String,
    value: String,
    unit: String,
    source: String,
    page_no: String,
    download_url: String,
}

impl IndicatorRow {
    /// 由原始字段构造数据行
    ///
    /// 所有字段都会被规范化；规范化后指标名称为空时返回 `None`。
    pub fn new(fields: RowFields) -> Option<Self> {
        let indicator = normalize_text(&fields.indicator);
        if indicator.is_empty() {
            return None;
        }

        Some(Self {
            time: normalize_text(&fields.time),
            region: normalize_text(&fields.region),
            indicator,
            value: normalize_text(&fields.value),
            unit: normalize_text(&fields.unit),
            source: normalize_text(&fields.source),
            page_no: normalize_text(&fields.page_no),
            download_url: String::new(),
        })
    }

    /// 写入捕获到的下载地址
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = url.into();
        self
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn page_no(&self) -> &str {
        &self.page_no
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }
}

/// 单页处理结果
///
/// 只用于日志和汇总，不做持久化。
#[derive(Debug, Clone, Default)]
pub struct PageCycleResult {
    /// 页序号，从 0 开始
    pub page_index: usize,
    /// 本页收集到的候选行数
    pub candidates: usize,
    /// 通过校验的数据行，保持 DOM 顺序
    pub rows: Vec<IndicatorRow>,
}

impl PageCycleResult {
    pub fn new(page_index: usize, candidates: usize) -> Self {
        Self {
            page_index,
            candidates,
            rows: Vec::new(),
        }
    }

    /// 通过校验的行数
    pub fn validated(&self) -> usize {
        self.rows.len()
    }
}
