pub mod chat;
pub mod dispatch;
pub mod entries;
pub mod status;
