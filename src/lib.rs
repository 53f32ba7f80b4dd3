pub mod common;
pub mod configs;
pub mod protocol;
pub mod server;
pub mod sources;
pub mod stream;
pub mod transport;
