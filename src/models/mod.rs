pub mod chat;
pub mod context;
pub mod health;
pub mod insight;
