use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// URL of the queue to drain (required)
    pub queue_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Index store base URL
    #[serde(default = "default_elastic_url")]
    pub elastic_url: String,

    /// Prefix for the dated destination indices
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    /// Document type submitted with every document
    #[serde(default = "default_document_type")]
    pub document_type: String,

    /// Messages requested per poll cycle
    #[serde(default = "default_max_messages")]
    pub max_messages: i32,

    /// Queue visibility timeout in seconds
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: i32,

    /// Queue long-poll wait in seconds
    #[serde(default = "default_wait_secs")]
    pub wait_secs: i32,

    /// Delay between successful poll cycles in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Cool-off after a queue retrieval failure in seconds
    #[serde(default = "default_cool_off_secs")]
    pub cool_off_secs: u64,

    /// Signing certificate cache capacity
    #[serde(default = "default_cert_cache_capacity")]
    pub cert_cache_capacity: usize,

    /// Signing certificate cache expiry in days
    #[serde(default = "default_cert_cache_ttl_days")]
    pub cert_cache_ttl_days: u64,

    /// Timeout for outbound HTTP requests in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_elastic_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index_prefix() -> String {
    "events-".to_string()
}

fn default_document_type() -> String {
    "event".to_string()
}

fn default_max_messages() -> i32 {
    10
}

fn default_visibility_timeout_secs() -> i32 {
    10
}

fn default_wait_secs() -> i32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_cool_off_secs() -> u64 {
    10
}

fn default_cert_cache_capacity() -> usize {
    100
}

fn default_cert_cache_ttl_days() -> u64 {
    14
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("SIFT"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("SIFT_LOG_LEVEL");
        std::env::remove_var("SIFT_MAX_MESSAGES");
        std::env::set_var("SIFT_QUEUE_URL", "https://sqs.test/queue");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.queue_url, "https://sqs.test/queue");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.elastic_url, "http://localhost:9200");
        assert_eq!(config.index_prefix, "events-");
        assert_eq!(config.max_messages, 10);
        assert_eq!(config.cool_off_secs, 10);
        assert_eq!(config.cert_cache_capacity, 100);
        assert_eq!(config.cert_cache_ttl_days, 14);

        std::env::remove_var("SIFT_QUEUE_URL");
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("SIFT_QUEUE_URL", "https://sqs.test/other-queue");
        std::env::set_var("SIFT_LOG_LEVEL", "debug");
        std::env::set_var("SIFT_MAX_MESSAGES", "5");
        std::env::set_var("SIFT_INDEX_PREFIX", "audit-");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.queue_url, "https://sqs.test/other-queue");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.max_messages, 5);
        assert_eq!(config.index_prefix, "audit-");

        // Clean up
        std::env::remove_var("SIFT_QUEUE_URL");
        std::env::remove_var("SIFT_LOG_LEVEL");
        std::env::remove_var("SIFT_MAX_MESSAGES");
        std::env::remove_var("SIFT_INDEX_PREFIX");
    }

    #[test]
    fn test_missing_queue_url_fails() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("SIFT_QUEUE_URL");

        assert!(ServiceConfig::from_env().is_err());
    }
}
