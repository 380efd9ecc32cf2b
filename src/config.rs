// src/config.rs
use clap::Parser;

use crate::api::ApiOptions;

/// 命令行参数，未指定时从环境变量（以及 .env 文件）读取
#[derive(Debug, Clone, Parser)]
#[command(name = "dmchat-server", version, about = "一对一私信服务器")]
pub struct Config {
    /// 数据库连接地址
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://dmchat.db")]
    pub database_url: String,

    /// 监听地址
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// 连接池大小
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    /// 以 JSON 格式输出日志
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// 允许用户给自己发送消息
    #[arg(long, env = "ALLOW_SELF_MESSAGES")]
    pub allow_self_messages: bool,
}

impl Config {
    pub fn api_options(&self) -> ApiOptions {
        ApiOptions {
            allow_self_messages: self.allow_self_messages,
        }
    }
}
