// src/messages.rs
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::error::{ChatError, ChatResult};
use crate::models::Message;
use crate::users::UserStore;
use crate::validation::SendMessage;

#[derive(Debug, Clone)]
pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 保存一条消息。
    ///
    /// 只执行一条 INSERT，由外键约束保证不会留下引用不存在用户的消息，
    /// 违反外键时再查询是哪一方不存在。
    /// 不要改成先查询再插入的事务：并发发送时读锁无法升级为写锁，会返回 SQLITE_BUSY。
    #[instrument(skip(self, input), fields(sender_id = input.sender_id, receiver_id = input.receiver_id))]
    pub async fn create(&self, input: &SendMessage) -> ChatResult<Message> {
        let res = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, sender_id, receiver_id, content, created_at
            "#,
        )
        .bind(input.sender_id)
        .bind(input.receiver_id)
        .bind(input.content())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match res {
            Ok(message) => {
                debug!(id = message.id, "消息已保存");
                Ok(message)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(self.missing_participant(input).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 外键检查失败后确定缺失的一方，发送者优先
    async fn missing_participant(&self, input: &SendMessage) -> ChatResult<ChatError> {
        let users = UserStore::new(self.pool.clone());
        if users.get(input.sender_id).await?.is_none() {
            return Ok(ChatError::NotFound {
                field: "sender_id",
                id: input.sender_id,
            });
        }
        // 用户不会被删除，外键失败时发送者存在就只能是接收者缺失
        Ok(ChatError::NotFound {
            field: "receiver_id",
            id: input.receiver_id,
        })
    }
}
