//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod config_handlers;
mod export_handlers;

pub use config_handlers::*;
pub use export_handlers::*;
