//! Upload pipeline adapters.
//!
//! [`UploadQueue`] drives staged jobs through an [`UploadPipeline`] strictly
//! in submission order and reports progress back as composer upload events.
//! [`LocalBlobStore`] is the bundled pipeline: content-addressed files under
//! a local directory.

pub mod error;
pub mod queue;
pub mod store;

pub use error::UploadError;
pub use queue::UploadQueue;
pub use store::{LocalBlobStore, UploadPipeline};
