// Server module entry point
// Listener binding, accept loop, connection serving and service lifecycle

pub mod connection;
pub mod listener;
pub mod service;
pub mod signal;

// `loop` is a keyword, the accept loop is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used types
pub use listener::ListenerBinding;
pub use service::HttpListenerService;
pub use signal::wait_for_shutdown;
