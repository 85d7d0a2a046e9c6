//! Read-only web dashboard over the memory bank.
//!
//! | Module   | Responsibility                                          |
//! |----------|---------------------------------------------------------|
//! | `server` | `ServerConfig`, router assembly, bind and serve         |
//! | `api`    | Route handlers, `AppState`, `ApiError`                  |
//! | `render` | HTML page and escaping                                  |
//!
//! Every request runs its queries on the blocking pool with a fresh
//! connection; nothing is cached between requests.

pub mod api;
pub mod render;
pub mod server;

pub use server::{ServerConfig, build_router, start_server};
