#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error("failed to connect the push socket to {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    #[error("the publisher is not connected")]
    NotConnected,

    #[error("the publisher is already connected")]
    AlreadyConnected,

    #[error("the publisher is closed")]
    Closed,

    #[error("failed to send the control message: {0}")]
    Send(#[source] zmq::Error),

    #[error("invalid ramp: {0}")]
    InvalidRamp(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse the configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("malformed control message: {0}")]
    Message(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Errors raised by the connection lifecycle rather than by a single send.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            PublishError::Connection { .. }
                | PublishError::NotConnected
                | PublishError::AlreadyConnected
                | PublishError::Closed
        )
    }
}

pub type PublishResult<T> = Result<T, PublishError>;
