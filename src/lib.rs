#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod control;
pub mod error;
pub mod export;
pub mod metrics;
pub use app::TaskManagerApp;
