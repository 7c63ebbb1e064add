pub mod id;
pub mod init;
pub mod phase;
pub mod status;
pub mod sync;
