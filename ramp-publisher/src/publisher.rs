use std::io::Write;

use log::{debug, info, warn};

use crate::error::{PublishError, PublishResult};
use crate::message::{ControlMessage, DEFAULT_CLIENT_NAME};
use crate::ramp::RampConfig;
use crate::transport::{PushSocket, SocketOptions, Transport};

enum State<T> {
    Disconnected,
    Connected(T),
    Closed,
}

/// What a finished ramp put on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Messages carrying a ramp value.
    pub ramp_messages: usize,
    /// Everything sent, unlock and disarm included.
    pub total_messages: usize,
    /// Last ramp value before the disarm, if the ramp was not empty.
    pub last_thrust: Option<f64>,
}

/// Pushes a thrust ramp over a single outbound connection and disarms at the end.
///
/// Lifecycle is `Disconnected -> Connected -> Closed`. The transport is released
/// exactly once, either by [`RampPublisher::close`] or when the publisher is dropped.
pub struct RampPublisher<T: Transport = PushSocket> {
    client_name: String,
    options: SocketOptions,
    state: State<T>,
}

impl<T: Transport> RampPublisher<T> {
    pub fn new(client_name: impl Into<String>, options: SocketOptions) -> Self {
        Self {
            client_name: client_name.into(),
            options,
            state: State::Disconnected,
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    pub fn connect(&mut self, endpoint: &str) -> PublishResult<()> {
        self.ensure_disconnected()?;

        info!("Connecting the socket to {} ...", endpoint);
        let transport = T::connect(endpoint, &self.options)?;
        self.attach(transport)
    }

    /// Adopts an already connected transport.
    pub fn attach(&mut self, transport: T) -> PublishResult<()> {
        self.ensure_disconnected()?;
        self.state = State::Connected(transport);
        Ok(())
    }

    fn ensure_disconnected(&self) -> PublishResult<()> {
        match self.state {
            State::Disconnected => Ok(()),
            State::Connected(_) => Err(PublishError::AlreadyConnected),
            State::Closed => Err(PublishError::Closed),
        }
    }

    fn transport(&mut self) -> PublishResult<&mut T> {
        match &mut self.state {
            State::Connected(transport) => Ok(transport),
            State::Disconnected => Err(PublishError::NotConnected),
            State::Closed => Err(PublishError::Closed),
        }
    }

    fn send(&mut self, message: ControlMessage) -> PublishResult<()> {
        let payload = message.encode();
        debug!("sending {}", payload);
        self.transport()?.send(&payload)
    }

    /// Sends the ramp, pausing `ramp.interval` after each value, then one zero-thrust message.
    ///
    /// Progress is written to `progress` as a single line rewritten with `\r`.
    /// A failing progress writer is logged and never keeps the disarm message from going out.
    pub async fn run<W: Write>(
        &mut self,
        ramp: &RampConfig,
        progress: &mut W,
    ) -> PublishResult<RunSummary> {
        let plan = ramp.plan()?;
        self.transport()?;

        let mut summary = RunSummary {
            ramp_messages: 0,
            total_messages: 0,
            last_thrust: None,
        };

        if ramp.unlock {
            debug!("unlocking thrust protection");
            self.send(ControlMessage::disarm(&self.client_name))?;
            summary.total_messages += 1;
        }

        info!("Sending input commands ...");
        for thrust in plan {
            self.send(ControlMessage::thrust(&self.client_name, thrust))?;
            summary.ramp_messages += 1;
            summary.total_messages += 1;
            summary.last_thrust = Some(thrust);

            report(progress, format_args!("\rThrust = {:.6}%", thrust));

            tokio::time::sleep(ramp.interval).await;
        }

        self.send(ControlMessage::disarm(&self.client_name))?;
        summary.total_messages += 1;
        report(progress, format_args!("\rThrust = {:.6}%\n", 0.0));

        info!(
            "ramp finished after {} messages, thrust reset to zero",
            summary.total_messages
        );
        Ok(summary)
    }

    /// Releases the transport. Closing twice is a no-op, closing before connecting is an error.
    pub fn close(&mut self) -> PublishResult<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Connected(transport) => {
                info!("Closing the socket");
                transport.close()
            }
            State::Closed => Ok(()),
            State::Disconnected => {
                self.state = State::Disconnected;
                Err(PublishError::NotConnected)
            }
        }
    }
}

fn report<W: Write>(progress: &mut W, line: std::fmt::Arguments) {
    if let Err(e) = progress.write_fmt(line).and_then(|_| progress.flush()) {
        warn!("failed to write progress: {e}");
    }
}

impl Default for RampPublisher<PushSocket> {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_NAME, SocketOptions::default())
    }
}

impl<T: Transport> Drop for RampPublisher<T> {
    fn drop(&mut self) {
        if let State::Connected(transport) = std::mem::replace(&mut self.state, State::Closed) {
            if let Err(e) = transport.close() {
                warn!("failed to close the transport on drop: {e}");
            }
        }
    }
}
