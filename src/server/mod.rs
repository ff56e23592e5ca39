//! Server lifecycle: pipeline assembly, binding, and shutdown

pub mod builder;
pub mod listener;
pub mod server;
pub mod state;

pub use builder::{run_server, ServerBuilder};
pub use listener::{BoundAddress, Listener, ListenOptions};
pub use server::Server;
pub use state::AppState;
