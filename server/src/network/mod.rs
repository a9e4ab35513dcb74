pub mod dispatcher;
pub mod extensions;
pub mod host;
