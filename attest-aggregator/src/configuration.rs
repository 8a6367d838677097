use config::{ConfigError, Map, Source, Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::gossip::GossipTopics;

/// Different kinds of execution environments
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum ExecutionEnvironment {
    /// Test environment, maximum logging
    Test,

    /// Production environment, minimum logging
    Production,
}

impl FromStr for ExecutionEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(ConfigError::Message(format!(
                "Unknown execution environment {s}"
            ))),
        }
    }
}

/// Errors raised when the collection parameters cannot lead to a proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The quorum threshold is zero
    #[error("quorum threshold must be at least 1")]
    InvalidQuorumThreshold,

    /// The error threshold is zero
    #[error("error threshold must be at least 1")]
    InvalidErrorThreshold,

    /// The collection timeout is zero
    #[error("collection timeout must be greater than zero")]
    InvalidTimeout,

    /// The quorum can not be reached with the members of the directory
    #[error(
        "quorum threshold {quorum_threshold} is greater than the directory size {directory_size}"
    )]
    QuorumAboveDirectorySize {
        /// Configured quorum threshold
        quorum_threshold: usize,
        /// Number of members of the directory
        directory_size: usize,
    },
}

/// Parameters of a collection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionParameters {
    /// Number of distinct valid signers required to build a proof
    pub quorum_threshold: usize,

    /// Number of declined responses after which the quorum is considered unreachable
    pub error_threshold: usize,

    /// Maximum duration of a session
    pub timeout: Duration,
}

impl CollectionParameters {
    /// CollectionParameters factory
    pub fn new(quorum_threshold: usize, error_threshold: usize, timeout: Duration) -> Self {
        Self {
            quorum_threshold,
            error_threshold,
            timeout,
        }
    }

    /// Check that a session with these parameters can reach its quorum against a directory of
    /// the given size.
    pub fn validate(&self, directory_size: usize) -> Result<(), ConfigurationError> {
        if self.quorum_threshold == 0 {
            return Err(ConfigurationError::InvalidQuorumThreshold);
        }
        if self.error_threshold == 0 {
            return Err(ConfigurationError::InvalidErrorThreshold);
        }
        if self.timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout);
        }
        if self.quorum_threshold > directory_size {
            return Err(ConfigurationError::QuorumAboveDirectorySize {
                quorum_threshold: self.quorum_threshold,
                directory_size,
            });
        }

        Ok(())
    }
}

/// Aggregator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// What kind of runtime environment the configuration is meant to.
    pub environment: ExecutionEnvironment,

    /// Network identifier, prefix of every gossip topic
    pub network: String,

    /// Number of distinct valid signers required to build a proof
    pub quorum_threshold: usize,

    /// Number of declined responses after which a session fails
    pub error_threshold: usize,

    /// Maximum duration of a session, in milliseconds
    pub collection_timeout_ms: u64,
}

impl Configuration {
    /// Create a sample configuration mainly for tests
    #[doc(hidden)]
    pub fn new_sample() -> Self {
        Self {
            environment: ExecutionEnvironment::Test,
            network: "devnet".to_string(),
            quorum_threshold: 3,
            error_threshold: 2,
            collection_timeout_ms: 60_000,
        }
    }

    /// Parameters of the collection sessions
    pub fn collection_parameters(&self) -> CollectionParameters {
        CollectionParameters::new(
            self.quorum_threshold,
            self.error_threshold,
            Duration::from_millis(self.collection_timeout_ms),
        )
    }

    /// Gossip topics of the configured network
    pub fn gossip_topics(&self) -> GossipTopics {
        GossipTopics::new(&self.network)
    }
}

/// Default configuration with all the default values for configurations.
///
/// The collection thresholds and timeout have no default value, they must be configured.
#[derive(Debug, Clone)]
pub struct DefaultConfiguration {
    /// Execution environment
    pub environment: ExecutionEnvironment,

    /// Network identifier
    pub network: String,
}

impl Default for DefaultConfiguration {
    fn default() -> Self {
        Self {
            environment: ExecutionEnvironment::Production,
            network: "testnet".to_string(),
        }
    }
}

impl From<ExecutionEnvironment> for ValueKind {
    fn from(value: ExecutionEnvironment) -> Self {
        match value {
            ExecutionEnvironment::Production => ValueKind::String("Production".to_string()),
            ExecutionEnvironment::Test => ValueKind::String("Test".to_string()),
        }
    }
}

impl Source for DefaultConfiguration {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut result = Map::new();
        let namespace = "default configuration".to_string();
        let myself = self.clone();
        result.insert(
            "environment".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.environment)),
        );
        result.insert(
            "network".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.network)),
        );

        Ok(result)
    }
}
