#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod avatar;
pub mod config;
pub mod contact;
pub mod data;
pub mod embed;
pub mod github;
pub mod icons;
pub mod intro;
pub mod logging;
pub mod markdown;
pub mod modal;
pub mod navigator;
pub mod portfolio;
pub mod resume;
pub mod scroll;
pub mod sections;
pub mod theme;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
