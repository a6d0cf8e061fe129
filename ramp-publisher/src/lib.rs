pub mod config;
pub mod error;
pub mod message;
pub mod publisher;
pub mod ramp;
pub mod transport;

pub use config::ApplicationConfig;
pub use error::{PublishError, PublishResult};
pub use message::{ControlMessage, Ctrl};
pub use publisher::{RampPublisher, RunSummary};
pub use ramp::{RampConfig, RampPlan};
pub use transport::{PushSocket, SocketOptions, Transport};
