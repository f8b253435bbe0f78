pub mod cache;
pub mod classifier;
pub mod config;
pub mod export;
pub mod health;
pub mod hierarchy;
pub mod input;
pub mod model;
pub mod reattach;
pub mod session;
pub mod slug;
#[cfg(feature = "cache")]
pub mod storage;
pub mod summary;
pub mod view;
