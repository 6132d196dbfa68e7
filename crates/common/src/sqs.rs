mod client;
mod poller;
mod traits;

pub use client::*;
pub use poller::*;
pub use traits::*;
