pub mod config;
pub mod constants;
pub mod context;
pub mod keyring;
pub mod message;
pub mod notice;
pub mod session;
