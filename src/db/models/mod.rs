//! Database models split into domain-specific modules.

pub mod chat;
pub mod common;
pub mod user;
pub mod watchlist;

pub use chat::*;
pub use common::*;
pub use user::*;
pub use watchlist::*;
