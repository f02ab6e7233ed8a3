pub mod batch;
pub mod concat;
pub mod error;
pub mod events;
pub mod io;
pub mod model;
pub mod normalize;
pub mod options;

pub use error::{LoadError, MergeError, NormalizeError, Result};
