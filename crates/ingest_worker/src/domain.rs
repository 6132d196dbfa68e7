mod cert_cache;
mod index_service;
mod notification_service;
mod verifier;

pub use cert_cache::*;
pub use index_service::*;
pub use notification_service::*;
pub use verifier::*;
