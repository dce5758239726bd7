pub mod config;
pub mod error;
pub mod metadata;
pub mod models;
pub mod title;
pub mod traits;

pub use config::*;
pub use error::*;
pub use metadata::*;
pub use models::*;
pub use title::*;
pub use traits::*;
