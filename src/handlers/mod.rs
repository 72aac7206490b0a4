//! Handler module

pub mod chat;
pub mod connection;
pub mod dispatch;
pub mod reaper;
pub mod room;

pub use chat::*;
pub use connection::*;
pub use dispatch::*;
pub use reaper::*;
pub use room::*;
