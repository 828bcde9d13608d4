//! The resolver and its boundary to the host environment.

mod callbacks;
mod host;
mod registry;
mod resolve;

pub use callbacks::Handler;
pub use host::{Definition, Host, Materialize, Source};
pub use registry::{LoadKind, LoadRecord};
pub use resolve::Resolver;
