// src/client.rs
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::api::Api;
use crate::protocol::{ClientRequest, ServerResponse};
use crate::utils::{read_frame, write_packet};

/// 一个客户端连接。连接本身不保存任何会话状态，每个请求都要显式带上用户 id。
pub struct Client {
    api: Arc<Api>,
    peer: SocketAddr,
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl Client {
    pub fn new(socket: TcpStream, peer: SocketAddr, api: Arc<Api>) -> Self {
        let (reader, writer) = socket.into_split();
        Self {
            api,
            peer,
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
        }
    }

    pub async fn send_packet(&mut self, msg: &ServerResponse) -> Result<()> {
        write_packet(&mut self.writer, msg).await
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(frame) = read_frame(&mut self.reader).await? else {
                info!(peer = %self.peer, "客户端断开连接");
                break;
            };

            let response = match serde_json::from_slice::<ClientRequest>(&frame) {
                Ok(request) => {
                    debug!(peer = %self.peer, ?request, "收到请求");
                    handle_request(&self.api, request).await
                }
                Err(e) => {
                    warn!(peer = %self.peer, "无效的请求格式: {e}");
                    ServerResponse::bad_request(format!("无效的请求格式: {e}"))
                }
            };

            self.send_packet(&response).await?;
        }

        Ok(())
    }
}

/// 将一个请求分发给 `Api`，错误转换为错误响应
pub async fn handle_request(api: &Api, request: ClientRequest) -> ServerResponse {
    let result = match request {
        ClientRequest::RegisterUser { username } => api
            .register_user(&username)
            .await
            .map(|user| ServerResponse::User { user: Some(user) }),
        ClientRequest::GetUserByUsername { username } => api
            .get_user_by_username(&username)
            .await
            .map(|user| ServerResponse::User { user }),
        ClientRequest::ListUsers { exclude_id } => api
            .list_users(exclude_id)
            .await
            .map(|users| ServerResponse::Users { users }),
        ClientRequest::SendMessage {
            sender_id,
            receiver_id,
            content,
        } => api
            .send_message(sender_id, receiver_id, &content)
            .await
            .map(|message| ServerResponse::Message { message }),
        ClientRequest::GetMessageHistory {
            user1_id,
            user2_id,
            limit,
            offset,
        } => api
            .get_message_history(user1_id, user2_id, limit, offset)
            .await
            .map(|messages| ServerResponse::Messages { messages }),
        ClientRequest::Healthcheck => Ok(ServerResponse::Health {
            status: "ok".to_string(),
            timestamp: api.healthcheck(),
        }),
    };

    result.unwrap_or_else(ServerResponse::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiOptions;
    use crate::db::in_memory_pool;

    async fn setup_api() -> Api {
        Api::new(in_memory_pool().await.unwrap(), ApiOptions::default())
    }

    #[tokio::test]
    async fn dispatch_register_and_lookup() {
        let api = setup_api().await;
        let resp = handle_request(
            &api,
            ClientRequest::RegisterUser {
                username: "alice".to_string(),
            },
        )
        .await;
        let ServerResponse::User { user: Some(alice) } = resp else {
            panic!("unexpected response: {resp:?}");
        };

        let resp = handle_request(
            &api,
            ClientRequest::GetUserByUsername {
                username: "alice".to_string(),
            },
        )
        .await;
        assert_eq!(resp, ServerResponse::User { user: Some(alice) });

        let resp = handle_request(
            &api,
            ClientRequest::GetUserByUsername {
                username: "nobody".to_string(),
            },
        )
        .await;
        assert_eq!(resp, ServerResponse::User { user: None });
    }

    #[tokio::test]
    async fn dispatch_errors() {
        let api = setup_api().await;
        let resp = handle_request(
            &api,
            ClientRequest::SendMessage {
                sender_id: 999999,
                receiver_id: 1,
                content: "hi".to_string(),
            },
        )
        .await;
        match resp {
            ServerResponse::Error { kind, field, .. } => {
                assert_eq!(kind, "not_found");
                assert_eq!(field.as_deref(), Some("sender_id"));
            }
            other => panic!("unexpected response: {other:?}"),
        }

        let resp = handle_request(
            &api,
            ClientRequest::GetMessageHistory {
                user1_id: 1,
                user2_id: 2,
                limit: None,
                offset: Some(-3),
            },
        )
        .await;
        assert!(matches!(resp, ServerResponse::Error { ref kind, .. } if kind == "validation"));
    }

    #[tokio::test]
    async fn dispatch_healthcheck() {
        let api = setup_api().await;
        let resp = handle_request(&api, ClientRequest::Healthcheck).await;
        assert!(matches!(resp, ServerResponse::Health { ref status, .. } if status == "ok"));
    }
}
