pub mod base;
pub mod logging;
pub mod server;
pub mod spotify;
pub mod stream;

pub use base::*;
pub use logging::*;
pub use server::*;
pub use spotify::*;
pub use stream::*;
