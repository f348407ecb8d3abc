pub mod config;
pub mod logging;

pub mod counter;
pub mod downloader;
pub mod interceptor;
pub mod maintenance;
pub mod menu;
pub mod names;
pub mod notify;
pub mod orchestrator;
pub mod panel;
pub mod retry;
pub mod state;
pub mod store;
pub mod transport;
pub mod url_model;
