#[allow(clippy::module_inception)]
pub mod error;
pub mod remote;

pub use error::{CliError, IngestError};
pub use remote::{DirectoryError, RemoteError};
