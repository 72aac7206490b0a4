//! Registry module

pub mod rooms;
pub mod users;

pub use rooms::*;
pub use users::*;
