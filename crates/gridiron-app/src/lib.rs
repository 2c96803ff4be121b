// Library root: re-exports all modules so integration tests and the
// `gridiron` binary can access the crate's public API.

pub mod app;
pub mod config;
pub mod db;
pub mod projections;
pub mod protocol;
pub mod ws_server;
