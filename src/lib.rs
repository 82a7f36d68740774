pub mod api;
pub mod documents;
pub mod games;
pub mod traits;

mod status;
pub use status::Status;

mod tracing;
pub use crate::tracing::Tracing;
