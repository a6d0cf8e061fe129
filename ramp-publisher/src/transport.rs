use std::time::Duration;

use log::debug;

use crate::error::{PublishError, PublishResult};

/// Input port of the receiving client, 1024 + 188.
pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:1212";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOptions {
    /// How long closing the socket may wait to flush queued frames.
    pub linger: Duration,
    /// Send high-water mark; libzmq's default when `None`.
    pub sndhwm: Option<i32>,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            linger: Duration::from_millis(1000),
            sndhwm: None,
        }
    }
}

/// One-way outbound message channel owned by a publisher.
pub trait Transport: Sized {
    fn connect(endpoint: &str, options: &SocketOptions) -> PublishResult<Self>;
    fn send(&mut self, payload: &str) -> PublishResult<()>;
    fn close(self) -> PublishResult<()>;
}

/// ZeroMQ PUSH socket together with the context that owns it.
pub struct PushSocket {
    socket: zmq::Socket,
    context: zmq::Context,
    endpoint: String,
}

impl PushSocket {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for PushSocket {
    fn connect(endpoint: &str, options: &SocketOptions) -> PublishResult<Self> {
        let connection_error = |source| PublishError::Connection {
            endpoint: endpoint.to_owned(),
            source,
        };

        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUSH).map_err(connection_error)?;

        let linger = i32::try_from(options.linger.as_millis()).unwrap_or(i32::MAX);
        socket.set_linger(linger).map_err(connection_error)?;
        if let Some(sndhwm) = options.sndhwm {
            socket.set_sndhwm(sndhwm).map_err(connection_error)?;
        }

        socket.connect(endpoint).map_err(connection_error)?;
        debug!("push socket connected to {}", endpoint);

        Ok(Self {
            socket,
            context,
            endpoint: endpoint.to_owned(),
        })
    }

    fn send(&mut self, payload: &str) -> PublishResult<()> {
        self.socket.send(payload, 0).map_err(PublishError::Send)
    }

    fn close(self) -> PublishResult<()> {
        let Self {
            socket,
            context,
            endpoint,
        } = self;

        // the socket must go before the context, terminating the context waits on it
        drop(socket);
        drop(context);
        debug!("push socket to {} closed", endpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_endpoint_is_a_connection_error() {
        let result = PushSocket::connect("not an endpoint", &SocketOptions::default());
        match result {
            Err(err @ PublishError::Connection { .. }) => {
                assert!(err.is_connection_error());
                assert!(err.to_string().contains("not an endpoint"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connect should fail"),
        }
    }

    #[test]
    fn test_connect_without_peer_then_close() {
        let options = SocketOptions {
            linger: Duration::ZERO,
            sndhwm: Some(100),
        };
        let mut socket = PushSocket::connect("tcp://127.0.0.1:1", &options).unwrap();
        assert_eq!(socket.endpoint(), "tcp://127.0.0.1:1");

        // frames queue up while the peer is missing
        socket.send("queued").unwrap();
        socket.close().unwrap();
    }
}
