pub mod archive;
pub mod asset;
pub mod cache;
pub mod checksum;
pub mod commands;
pub mod error;
pub mod http;
pub mod install;
pub mod matcher;
pub mod pipeline;
pub mod platform;
pub mod runtime;
pub mod source;
pub mod ui;

pub use error::InstallError;
