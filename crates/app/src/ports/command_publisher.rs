//! Command port: hands gate commands to the actuator transport.

use std::future::Future;

use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::gate::GateCommand;

/// Sends gate commands to actuators.
///
/// Delivery is command-and-forget: `Ok` means the transport accepted the
/// command, not that the gate moved. Implementations that can block on IO
/// must bound the wait so a slow transport cannot stall other zones.
pub trait CommandPublisher {
    /// Hand one command to the transport.
    fn publish_command(
        &self,
        command: &GateCommand,
    ) -> impl Future<Output = Result<(), FieldGateError>> + Send;
}

impl<T: CommandPublisher + Send + Sync> CommandPublisher for std::sync::Arc<T> {
    fn publish_command(
        &self,
        command: &GateCommand,
    ) -> impl Future<Output = Result<(), FieldGateError>> + Send {
        (**self).publish_command(command)
    }
}
