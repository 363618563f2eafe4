//! CLI command implementations

pub(crate) mod build;
pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod load;
pub(crate) mod report;
pub(crate) mod status;
