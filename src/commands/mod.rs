//! CLI commands implementation

pub mod ask;
pub mod delete;
pub mod init;
pub mod list;
pub mod preview;
pub mod prompt;
pub mod shell;
pub mod upload;

pub use ask::*;
pub use delete::*;
pub use init::*;
pub use list::*;
pub use preview::*;
pub use shell::*;
pub use upload::*;
