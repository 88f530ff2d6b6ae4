//! HTTP Handlers

mod config;
mod export;
mod ping;
mod websocket;

pub use config::*;
pub use export::*;
pub use ping::*;
pub use websocket::*;
