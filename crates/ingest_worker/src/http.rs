mod cert_fetcher;

pub use cert_fetcher::*;
