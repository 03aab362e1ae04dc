pub mod app;
pub mod config;
pub mod logging;
pub mod prefs;
pub mod render;
pub mod snow;
pub mod terminal;
