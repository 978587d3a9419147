pub mod document;
pub mod entity;
pub mod error;
pub mod geo;
pub mod math;
pub mod mesh;
pub mod preview;
pub mod render;
pub mod store;

pub use document::Document;
pub use error::{PfError, Result};
