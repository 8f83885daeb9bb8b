// Library surface for the binary, headless/integration tests and reuse.
// The binary only parses arguments and owns the terminal.
pub mod app;
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod contributions;
pub mod error;
pub mod fetch;
pub mod key_sequence;
pub mod loaders;
pub mod local_store;
pub mod profile;
pub mod runtime;
pub mod server;
pub mod typing;
pub mod ui;
pub mod util;
pub mod visitor_client;
pub mod visitors;
