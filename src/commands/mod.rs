pub mod convert;
pub mod info;
pub mod result;
pub mod shell;

pub use result::CommandResult;
