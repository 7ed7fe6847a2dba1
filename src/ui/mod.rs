//! Terminal presentation: the route table, page renderings, prompts and
//! the interactive conversation loop.

pub mod chat_loop;
pub mod prompt;
pub mod render;
pub mod routes;
