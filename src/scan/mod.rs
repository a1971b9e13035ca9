pub mod cancel;
pub mod chunker;
pub mod tally;
pub mod types;
pub mod worker;

pub use cancel::CancelToken;
pub use types::{Chunk, FileFormat, ReferenceFile, ScanOptions};
