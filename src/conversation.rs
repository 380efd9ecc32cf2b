// src/conversation.rs
//
// 两个用户之间的会话历史查询。会话是无序的用户对 {user1, user2}，
// 两个方向的消息都属于同一会话。

use tracing::instrument;

use crate::error::ChatResult;
use crate::messages::MessageStore;
use crate::models::Message;
use crate::validation::HistoryQuery;

impl MessageStore {
    /// 按时间倒序返回一页会话历史，时间相同则按 id 倒序，保证分页结果稳定。
    /// 不检查用户是否存在，不存在的用户只会查到空结果。
    #[instrument(skip(self))]
    pub async fn history(&self, query: &HistoryQuery) -> ChatResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, receiver_id, content, created_at
            FROM messages
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(query.user1_id)
        .bind(query.user2_id)
        .bind(query.user2_id)
        .bind(query.user1_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(self.pool())
        .await?;
        Ok(messages)
    }
}
