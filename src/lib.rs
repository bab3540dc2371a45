pub mod error;
pub mod link;
pub mod lywsd02;
pub mod request;

pub use error::{Error, Result};
