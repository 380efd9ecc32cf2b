// src/server.rs
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::Api;
use crate::client::Client;

/// 接受连接直到 `shutdown` 完成，每个连接一个任务
pub async fn serve(
    listener: TcpListener,
    api: Arc<Api>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    tokio::pin!(shutdown);

    loop {
        let (socket, addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => {
                info!("服务器停止接受新连接");
                break;
            }
        };
        info!(peer = %addr, "新连接");

        let api = api.clone();
        tokio::spawn(async move {
            let mut client = Client::new(socket, addr, api);
            if let Err(e) = client.run().await {
                error!(peer = %addr, "处理客户端时出错: {e:#}");
            }
        });
    }

    Ok(())
}
