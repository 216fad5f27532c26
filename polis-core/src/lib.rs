pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod test_utils;
pub mod types;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
