//! # fieldgate-adapter-mqtt
//!
//! MQTT adapter: connects the control loop to the field network.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker
//! - Subscribe to sensor topics (`<base>/sensors/<kind>/+`)
//! - Decode telemetry into [`SensorReading`]s and hand them to the
//!   [`ReadingDispatcher`], one task per message
//! - Publish gate commands on `<base>/commands/<channel>/<zone_id>`
//!
//! ## Dependency rule
//! Depends on `fieldgate-app` and `fieldgate-domain`.
//!
//! [`SensorReading`]: fieldgate_domain::reading::SensorReading

pub mod codec;
mod config;
mod error;
mod publisher;
pub mod topic;

pub use config::MqttConfig;
pub use error::MqttError;
pub use publisher::MqttCommandPublisher;
pub use topic::TopicLayout;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, Publish, QoS, SubscribeFilter};

use fieldgate_app::dispatcher::ReadingDispatcher;
use fieldgate_app::ports::{Clock, CommandPublisher, EventPublisher};

const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// Broker connection plus the topic layout it serves.
///
/// Nothing touches the network until [`MqttTransport::run`] polls the
/// event loop.
pub struct MqttTransport {
    client: AsyncClient,
    event_loop: EventLoop,
    topics: TopicLayout,
    publish_timeout: Duration,
}

impl MqttTransport {
    /// Prepare a client for the configured broker.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Topic`] if the configured topic layout is invalid.
    pub fn new(config: &MqttConfig) -> Result<Self, MqttError> {
        let topics = config.topics()?;
        let (client, event_loop) = AsyncClient::new(config.options(), config.channel_capacity);
        Ok(Self {
            client,
            event_loop,
            topics,
            publish_timeout: config.publish_timeout(),
        })
    }

    #[must_use]
    pub fn topics(&self) -> &TopicLayout {
        &self.topics
    }

    /// A command publisher sharing this transport's connection.
    #[must_use]
    pub fn command_publisher(&self) -> MqttCommandPublisher {
        MqttCommandPublisher::new(
            self.client.clone(),
            self.topics.clone(),
            self.publish_timeout,
        )
    }

    /// Drive the connection until `shutdown` resolves.
    ///
    /// Subscriptions are (re)issued on every broker `ConnAck`. Each inbound
    /// publish is decoded and dispatched on its own task, so a slow command
    /// publish never holds up the next reading. Tasks already spawned keep
    /// running after shutdown.
    pub async fn run<P, E, C>(
        self,
        dispatcher: Arc<ReadingDispatcher<P, E, C>>,
        shutdown: impl Future<Output = ()>,
    ) where
        P: CommandPublisher + Send + Sync + 'static,
        E: EventPublisher + Send + Sync + 'static,
        C: Clock + 'static,
    {
        let Self {
            client,
            mut event_loop,
            topics,
            ..
        } = self;
        let topics = Arc::new(topics);
        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                () = &mut shutdown => break,
                event = event_loop.poll() => event,
            };

            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("connected to MQTT broker");
                    if let Err(err) = subscribe_all(&client, &topics) {
                        tracing::warn!(%err, "subscribe request not queued");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let dispatcher = Arc::clone(&dispatcher);
                    let topics = Arc::clone(&topics);
                    tokio::spawn(async move {
                        handle_publish(&topics, &dispatcher, &publish).await;
                    });
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        %err,
                        backoff_secs = RECONNECT_BACKOFF.as_secs(),
                        "MQTT connection error, retrying"
                    );
                    tokio::select! {
                        () = &mut shutdown => break,
                        () = tokio::time::sleep(RECONNECT_BACKOFF) => {}
                    }
                }
            }
        }

        tracing::info!("MQTT transport stopping");
        if let Err(err) = client.try_disconnect() {
            tracing::debug!(%err, "disconnect request not queued");
        }
    }
}

/// Queue one SUBSCRIBE carrying every sensor filter, so the request
/// fits a client queue of any capacity.
fn subscribe_all(client: &AsyncClient, topics: &TopicLayout) -> Result<(), MqttError> {
    let filters: Vec<SubscribeFilter> = topics
        .subscribe_filters()
        .into_iter()
        .map(|filter| SubscribeFilter::new(filter, QoS::AtLeastOnce))
        .collect();
    let count = filters.len();
    client
        .try_subscribe_many(filters)
        .map_err(MqttError::Client)?;
    tracing::info!(count, "subscribed to sensor topics");
    Ok(())
}

async fn handle_publish<P, E, C>(
    topics: &TopicLayout,
    dispatcher: &ReadingDispatcher<P, E, C>,
    publish: &Publish,
) where
    P: CommandPublisher,
    E: EventPublisher,
    C: Clock,
{
    let reading = match codec::decode_message(topics, &publish.topic, &publish.payload) {
        Ok(reading) => reading,
        Err(err) => {
            tracing::warn!(%err, topic = %publish.topic, "dropping undecodable message");
            return;
        }
    };

    let sensor_id = reading.sensor_id();
    if let Err(err) = dispatcher.dispatch(reading).await {
        tracing::debug!(%err, %sensor_id, "reading not fully processed");
    }
}
