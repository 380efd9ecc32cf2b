// src/api.rs
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::error::{ChatError, ChatResult};
use crate::messages::MessageStore;
use crate::models::{Message, User};
use crate::users::UserStore;
use crate::validation::{validate_history, validate_send_message, validate_username};

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiOptions {
    pub allow_self_messages: bool,
}

/// 所有请求的入口：先校验，再交给对应的存储
#[derive(Debug, Clone)]
pub struct Api {
    users: UserStore,
    messages: MessageStore,
    options: ApiOptions,
}

impl Api {
    pub fn new(pool: SqlitePool, options: ApiOptions) -> Self {
        Self {
            users: UserStore::new(pool.clone()),
            messages: MessageStore::new(pool),
            options,
        }
    }

    pub async fn register_user(&self, username: &str) -> ChatResult<User> {
        let input = validate_username(username).inspect_err(log_failure)?;
        let user = self.users.register(&input).await.inspect_err(log_failure)?;
        info!(id = user.id, username = %user.username, "新用户注册");
        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> ChatResult<Option<User>> {
        self.users
            .get_by_username(username)
            .await
            .inspect_err(log_failure)
    }

    pub async fn list_users(&self, exclude_id: Option<i64>) -> ChatResult<Vec<User>> {
        self.users.list_all(exclude_id).await.inspect_err(log_failure)
    }

    pub async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> ChatResult<Message> {
        let input = validate_send_message(
            sender_id,
            receiver_id,
            content,
            self.options.allow_self_messages,
        )
        .inspect_err(log_failure)?;
        let message = self.messages.create(&input).await.inspect_err(log_failure)?;
        info!(id = message.id, sender_id, receiver_id, "消息已发送");
        Ok(message)
    }

    pub async fn get_message_history(
        &self,
        user1_id: i64,
        user2_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ChatResult<Vec<Message>> {
        let query = validate_history(user1_id, user2_id, limit, offset).inspect_err(log_failure)?;
        self.messages.history(&query).await.inspect_err(log_failure)
    }

    pub fn healthcheck(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

fn log_failure(err: &ChatError) {
    if err.is_recoverable() {
        warn!(kind = err.kind(), field = err.field(), "请求被拒绝: {err}");
    } else {
        error!("存储操作失败: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::in_memory_pool;

    async fn setup_api(options: ApiOptions) -> Api {
        Api::new(in_memory_pool().await.unwrap(), options)
    }

    #[tokio::test]
    async fn alice_and_bob() {
        let api = setup_api(ApiOptions::default()).await;
        let alice = api.register_user("alice").await.unwrap();
        let bob = api.register_user("bob").await.unwrap();
        assert_eq!((alice.id, bob.id), (1, 2));

        api.send_message(1, 2, "hi").await.unwrap();
        api.send_message(2, 1, "hello").await.unwrap();

        let history = api.get_message_history(1, 2, Some(50), Some(0)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "hello");
        assert_eq!((history[0].sender_id, history[0].receiver_id), (2, 1));
        assert_eq!(history[1].content, "hi");
        assert_eq!((history[1].sender_id, history[1].receiver_id), (1, 2));
    }

    #[tokio::test]
    async fn validation_runs_before_storage() {
        let api = setup_api(ApiOptions::default()).await;
        let err = api.register_user("no spaces allowed").await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(api.list_users(None).await.unwrap().is_empty());

        let err = api.send_message(999999, 1, "").await.unwrap_err();
        assert_eq!(err.field(), Some("content"));

        let err = api.get_message_history(1, 2, Some(101), None).await.unwrap_err();
        assert_eq!(err.field(), Some("limit"));
    }

    #[tokio::test]
    async fn register_conflict() {
        let api = setup_api(ApiOptions::default()).await;
        api.register_user("dave").await.unwrap();
        let err = api.register_user("dave").await.unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert_eq!(api.list_users(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_registration_has_one_winner() {
        let api = setup_api(ApiOptions::default()).await;
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let api = api.clone();
                tokio::spawn(async move { api.register_user("racer").await })
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => ok += 1,
                Err(ChatError::Conflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn self_messages() {
        let api = setup_api(ApiOptions::default()).await;
        let erin = api.register_user("erin").await.unwrap();
        let err = api.send_message(erin.id, erin.id, "note").await.unwrap_err();
        assert_eq!(err.field(), Some("receiver_id"));

        let api = setup_api(ApiOptions {
            allow_self_messages: true,
        })
        .await;
        let erin = api.register_user("erin").await.unwrap();
        api.send_message(erin.id, erin.id, "note").await.unwrap();
        let history = api
            .get_message_history(erin.id, erin.id, None, None)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn unknown_sender() {
        let api = setup_api(ApiOptions::default()).await;
        let bob = api.register_user("bob").await.unwrap();
        let err = api.send_message(999999, bob.id, "hi").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.field(), Some("sender_id"));
    }
}
