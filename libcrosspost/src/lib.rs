//! Crosspost - publish one post to several social networks at once
//!
//! This library holds the domain types, SQLite persistence, platform
//! publishers, and the services the HTTP server is built on.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{CrosspostError, Result};
pub use service::CrosspostService;
pub use types::{
    AccountUpdate, ConnectedAccount, ImageUpload, NewConnectedAccount, Platform, Post,
    PostStatus, PostWithResults, PublishingResult, ResultStatus, UpsertUser, User,
};
