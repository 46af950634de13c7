pub mod http;
pub mod roster;

pub use http::HttpBackend;
pub use roster::RosterVerifier;
