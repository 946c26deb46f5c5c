// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

/// 指标数据行
///
/// `crawled_at` 列由数据库默认值填充，不在模型中映射。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "indicators")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub zcode: Option<String>,
    pub indicate_name: Option<String>,
    pub search_mode_one: Option<i32>,
    pub area: Option<String>,
    pub begin_year: Option<i32>,
    pub end_year: Option<i32>,
    pub data_type: Option<String>,
    pub time: String,
    pub region: String,
    pub indicator: String,
    pub value: String,
    pub unit: String,
    pub source: String,
    pub page_no: String,
    pub download_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
