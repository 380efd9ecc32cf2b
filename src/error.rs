// src/error.rs
use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

/// 核心操作返回的错误类型。
///
/// 除 `Storage` 外都属于调用方可以修正输入后重试的错误。
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{field} 无效: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{field} 已存在: {value}")]
    Conflict { field: &'static str, value: String },

    #[error("{field} 对应的用户不存在: {id}")]
    NotFound { field: &'static str, id: i64 },

    #[error("存储错误: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ChatError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// 协议中使用的稳定错误代码
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Conflict { .. } => "conflict",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "storage",
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. }
            | Self::Conflict { field, .. }
            | Self::NotFound { field, .. } => Some(field),
            Self::Storage(_) => None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
