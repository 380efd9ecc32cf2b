// src/protocol.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::models::{Message, User};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientRequest {
    RegisterUser {
        username: String,
    },
    GetUserByUsername {
        username: String,
    },
    ListUsers {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude_id: Option<i64>,
    },
    SendMessage {
        sender_id: i64,
        receiver_id: i64,
        content: String,
    },
    GetMessageHistory {
        user1_id: i64,
        user2_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<i64>,
    },
    Healthcheck,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerResponse {
    User {
        user: Option<User>,
    },
    Users {
        users: Vec<User>,
    },
    Message {
        message: Message,
    },
    Messages {
        messages: Vec<Message>,
    },
    Health {
        status: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        message: String,
    },
}

impl ServerResponse {
    /// 请求本身无法解析时返回的错误
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Error {
            kind: "bad_request".to_string(),
            field: None,
            message: message.into(),
        }
    }
}

impl From<ChatError> for ServerResponse {
    fn from(err: ChatError) -> Self {
        let message = match &err {
            // 存储错误的细节只写日志，不返回给客户端
            ChatError::Storage(_) => "服务器内部错误，请稍后重试".to_string(),
            other => other.to_string(),
        };
        Self::Error {
            kind: err.kind().to_string(),
            field: err.field().map(str::to_string),
            message,
        }
    }
}
