pub mod init;
pub mod network;
pub mod world;
