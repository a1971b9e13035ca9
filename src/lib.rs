pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod reference;
pub mod scan;
pub mod validator;

pub use error::{ConfigError, ScanError, ValidationError};
pub use scan::CancelToken;
pub use validator::{Validator, ValidatorConfig};
