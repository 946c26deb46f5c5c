// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 启动 Prometheus 指标导出端点
///
/// # 参数
///
/// * `listen_addr` - 监听地址，例如 `0.0.0.0:9000`
///
/// # 返回值
///
/// * `Ok(())` - 已尝试安装导出器；端口被占用时只记录警告
/// * `Err` - 监听地址无法解析
pub fn init_metrics(listen_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics address: {}", listen_addr))?;

    // 端口被占用时继续运行，只是不导出指标
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return Ok(());
    }

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
