// src/users.rs
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::error::{ChatError, ChatResult};
use crate::models::User;
use crate::validation::RegisterUser;

#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 注册新用户。
    ///
    /// 用户名唯一性由表上的 UNIQUE 约束保证，插入冲突时返回 `Conflict`，
    /// 并发注册同名用户时只会有一个成功。
    #[instrument(skip(self, input), fields(username = %input.username()))]
    pub async fn register(&self, input: &RegisterUser) -> ChatResult<User> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, created_at)
            VALUES (?, ?)
            RETURNING id, username, created_at
            "#,
        )
        .bind(input.username())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match res {
            Ok(user) => {
                debug!(id = user.id, "用户已创建");
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ChatError::Conflict {
                    field: "username",
                    value: input.username().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_username(&self, username: &str) -> ChatResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> ChatResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, username, created_at FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    /// 按注册顺序列出所有用户，`exclude_id` 用来去掉调用者自己
    #[instrument(skip(self))]
    pub async fn list_all(&self, exclude_id: Option<i64>) -> ChatResult<Vec<User>> {
        let users = match exclude_id {
            Some(id) => {
                sqlx::query_as::<_, User>(
                    "SELECT id, username, created_at FROM users WHERE id != ? ORDER BY id",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>("SELECT id, username, created_at FROM users ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(users)
    }
}
