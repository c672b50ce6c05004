pub mod backend;
/// HTTP transport for the records API.
pub mod http;
/// In-memory emulation of the records API.
pub mod memory;

pub use backend::{Backend, Method, Request, Response, TransportError};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
