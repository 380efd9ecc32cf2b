// src/validation.rs
//
// 请求在进入存储层之前都要先经过这里。校验通过后得到的类型只能由本模块构造，
// 存储层只接受这些类型。

use crate::error::{ChatError, ChatResult};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const CONTENT_MIN_LEN: usize = 1;
pub const CONTENT_MAX_LEN: usize = 1000;
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUser {
    username: String,
}

impl RegisterUser {
    pub fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    content: String,
}

impl SendMessage {
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// 一页会话历史的查询条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub user1_id: i64,
    pub user2_id: i64,
    pub limit: i64,
    pub offset: i64,
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

pub fn validate_username(username: &str) -> ChatResult<RegisterUser> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(ChatError::validation(
            "username",
            format!("长度必须在 {USERNAME_MIN_LEN} 到 {USERNAME_MAX_LEN} 个字符之间"),
        ));
    }
    if !username.chars().all(is_username_char) {
        return Err(ChatError::validation(
            "username",
            "只能包含字母、数字、下划线和连字符",
        ));
    }
    Ok(RegisterUser {
        username: username.to_string(),
    })
}

pub fn validate_send_message(
    sender_id: i64,
    receiver_id: i64,
    content: &str,
    allow_self_messages: bool,
) -> ChatResult<SendMessage> {
    let len = content.chars().count();
    if !(CONTENT_MIN_LEN..=CONTENT_MAX_LEN).contains(&len) {
        return Err(ChatError::validation(
            "content",
            format!("长度必须在 {CONTENT_MIN_LEN} 到 {CONTENT_MAX_LEN} 个字符之间"),
        ));
    }
    if sender_id == receiver_id && !allow_self_messages {
        return Err(ChatError::validation("receiver_id", "不能给自己发送消息"));
    }
    Ok(SendMessage {
        sender_id,
        receiver_id,
        content: content.to_string(),
    })
}

pub fn validate_history(
    user1_id: i64,
    user2_id: i64,
    limit: Option<i64>,
    offset: Option<i64>,
) -> ChatResult<HistoryQuery> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ChatError::validation(
            "limit",
            format!("必须是 1 到 {MAX_HISTORY_LIMIT} 之间的整数"),
        ));
    }
    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(ChatError::validation("offset", "不能为负数"));
    }
    Ok(HistoryQuery {
        user1_id,
        user2_id,
        limit,
        offset,
    })
}
