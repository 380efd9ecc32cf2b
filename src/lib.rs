// src/lib.rs
pub mod api;
pub mod client;
pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod logging;
pub mod messages;
pub mod models;
pub mod protocol;
pub mod server;
pub mod users;
pub mod utils;
pub mod validation;

pub use api::{Api, ApiOptions};
pub use error::{ChatError, ChatResult};
pub use models::{Message, User};
