// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task_parameters::TaskParameters;
use crate::utils::errors::TargetUrlError;
use url::Url;

/// 由基础地址和任务参数构造检索页地址
///
/// 空白取值的参数被丢弃，其余参数按任务中的原始顺序编码为查询串，
/// 替换基础地址上已有的查询部分。
///
/// # 参数
///
/// * `base_url` - 检索页基础地址
/// * `params` - 任务参数
///
/// # 返回值
///
/// * `Ok(Url)` - 完整的目标地址
/// * `Err(TargetUrlError)` - 基础地址无效或编码失败
pub fn build_target_url(base_url: &str, params: &TaskParameters) -> Result<Url, TargetUrlError> {
    let mut url = Url::parse(base_url)?;
    let query = serde_urlencoded::to_string(params.cleaned())?;
    url.set_query(if query.is_empty() { None } else { Some(&query) });
    Ok(url)
}
