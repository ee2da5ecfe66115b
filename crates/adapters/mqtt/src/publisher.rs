//! [`CommandPublisher`] backed by a rumqttc client.

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, QoS};

use fieldgate_app::ports::CommandPublisher;
use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::gate::GateCommand;

use crate::codec;
use crate::error::MqttError;
use crate::topic::TopicLayout;

/// Publishes gate commands on `<base>/commands/<channel>/<zone_id>`.
///
/// `Ok` means the command was queued on the client; the event loop owns
/// delivery from there.
#[derive(Clone)]
pub struct MqttCommandPublisher {
    client: AsyncClient,
    topics: TopicLayout,
    timeout: Duration,
}

impl MqttCommandPublisher {
    #[must_use]
    pub fn new(client: AsyncClient, topics: TopicLayout, timeout: Duration) -> Self {
        Self {
            client,
            topics,
            timeout,
        }
    }
}

impl CommandPublisher for MqttCommandPublisher {
    fn publish_command(
        &self,
        command: &GateCommand,
    ) -> impl Future<Output = Result<(), FieldGateError>> + Send {
        let topic = self.topics.command_topic(command.zone_id());
        let payload = codec::encode_command(command);
        let client = self.client.clone();
        let timeout = self.timeout;

        async move {
            let payload = payload?;
            match tokio::time::timeout(
                timeout,
                client.publish(topic.as_str(), QoS::AtLeastOnce, false, payload),
            )
            .await
            {
                Ok(Ok(())) => {
                    tracing::debug!(%topic, "gate command queued");
                    Ok(())
                }
                Ok(Err(err)) => Err(MqttError::Client(err).into()),
                Err(_) => Err(MqttError::Timeout(timeout).into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MqttConfig;
    use fieldgate_domain::gate::GateAction;
    use fieldgate_domain::id::ZoneId;
    use fieldgate_domain::time::now;

    fn command() -> GateCommand {
        GateCommand::new(ZoneId::new(1), GateAction::Open, "dry", now())
    }

    fn publisher(config: &MqttConfig) -> (MqttCommandPublisher, rumqttc::EventLoop) {
        let (client, event_loop) = AsyncClient::new(config.options(), config.channel_capacity);
        let publisher =
            MqttCommandPublisher::new(client, config.topics().unwrap(), config.publish_timeout());
        (publisher, event_loop)
    }

    #[tokio::test]
    async fn should_queue_command_on_client() {
        let config = MqttConfig::default();
        let (publisher, _event_loop) = publisher(&config);
        assert!(publisher.publish_command(&command()).await.is_ok());
    }

    #[tokio::test]
    async fn should_time_out_when_request_queue_is_full() {
        let config = MqttConfig {
            channel_capacity: 1,
            publish_timeout_ms: 50,
            ..MqttConfig::default()
        };
        let (publisher, _event_loop) = publisher(&config);

        publisher.publish_command(&command()).await.unwrap();
        let err = publisher.publish_command(&command()).await.unwrap_err();

        assert!(matches!(err, FieldGateError::Transport(_)));
        assert!(err.to_string().contains("transport"));
    }
}
