//! kappachat is a terminal client for browsing AI characters and chatting
//! with them.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] wraps the chat API: registration, login, chat and history.
//! - [`backend`] is a thin PostgREST/functions client for the optional data
//!   backend that stores custom characters and synced conversations.
//! - [`auth`] keeps the signed-in session, with the secret in the OS keyring.
//! - [`character`] holds the built-in cast and the per-user directory.
//! - [`conversation`] owns message storage, local and remote mirroring, reply
//!   sources and the view state machine.
//! - [`core`] carries configuration, notices, shared types and the
//!   [`core::context::AppContext`] that wires everything together.
//! - [`ui`] renders pages, resolves routes and runs the chat loop.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod backend;
pub mod character;
pub mod cli;
pub mod conversation;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
