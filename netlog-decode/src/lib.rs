pub mod api;
pub mod config;
pub mod decoder;
pub mod detector;
pub mod event;
pub mod output;
pub mod pipeline;
