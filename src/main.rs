// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use dmchat_server::config::Config;
use dmchat_server::db::init_db_pool;
use dmchat_server::logging::init_tracing;
use dmchat_server::server::serve;
use dmchat_server::Api;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 中的环境变量
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_tracing("dmchat_server=info", config.log_json);

    // 初始化数据库连接池和表结构
    let pool = init_db_pool(&config.database_url, config.max_connections).await?;
    let api = Arc::new(Api::new(pool.clone(), config.api_options()));

    // 启动TCP服务器
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "服务器已启动");

    serve(listener, api, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("无法监听退出信号: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    pool.close().await;
    Ok(())
}
