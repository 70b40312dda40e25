//! NATS connection management.
//!
//! Provides a thin wrapper around `async-nats` with dashboard-specific
//! defaults, the JSON payload codec, and helpers for the command and
//! request/reply subjects.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_nats::Event;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::error::NetError;
use crate::messages::{EntityCommand, headers};
use crate::subjects::Subjects;

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// The environment variable used to override the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// Encode a value to JSON bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    serde_json::to_vec(value).map_err(NetError::Encode)
}

/// Decode a value from JSON bytes. Every channel payload is a JSON document.
///
/// # Errors
///
/// Returns [`NetError::Decode`] if deserialisation fails.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, NetError> {
    serde_json::from_slice(bytes).map_err(NetError::Decode)
}

/// Credentials attached to every outbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAuth {
    /// Anti-forgery token. Commands are refused locally when unset.
    pub csrf_token: Option<String>,
    /// Identifier of this dashboard instance.
    pub instance_id: String,
}

impl CommandAuth {
    /// Build the header map for a command of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::MissingHeader`] if no anti-forgery token is set.
    pub fn headers(&self, msg_type: &str) -> Result<async_nats::HeaderMap, NetError> {
        let token = self
            .csrf_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NetError::MissingHeader(headers::CSRF_TOKEN.to_string()))?;

        let mut map = async_nats::HeaderMap::new();
        map.insert(headers::CSRF_TOKEN, token);
        map.insert(headers::MSG_TYPE, msg_type);
        map.insert(headers::INSTANCE_ID, self.instance_id.as_str());
        Ok(map)
    }
}

/// Watches client events and signals when the connection comes back after
/// it was lost.
///
/// The first connection is not a reconnect. Reconnects that happen while
/// nobody waits collapse into a single wake-up.
#[derive(Debug, Default)]
pub struct ReconnectWatch {
    disconnected: AtomicBool,
    reconnected: Notify,
}

impl ReconnectWatch {
    /// Record one client event.
    pub fn observe(&self, event: &Event) {
        match event {
            Event::Disconnected => {
                self.disconnected.store(true, Ordering::SeqCst);
                warn!("NATS connection lost");
            }
            Event::Connected => {
                if self.disconnected.swap(false, Ordering::SeqCst) {
                    info!("NATS connection re-established");
                    self.reconnected.notify_one();
                }
            }
            other => debug!(event = ?other, "NATS client event"),
        }
    }

    /// Wait for the next reconnect.
    pub async fn reconnected(&self) {
        self.reconnected.notified().await;
    }
}

/// A wrapper around an `async-nats` client with dashboard-specific helpers.
#[derive(Debug, Clone)]
pub struct NatsConnection {
    /// The underlying NATS client.
    client: async_nats::Client,
    /// Reconnect signal fed by the client's event callback.
    watch: Arc<ReconnectWatch>,
}

impl NatsConnection {
    /// Connect to NATS at the specified URL.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect_to(url: &str) -> Result<Self, NetError> {
        info!(url, "connecting to NATS");
        let watch = Arc::new(ReconnectWatch::default());
        let events = Arc::clone(&watch);
        let client = async_nats::ConnectOptions::new()
            .event_callback(move |event| {
                let events = Arc::clone(&events);
                async move { events.observe(&event) }
            })
            .connect(url)
            .await?;
        info!("NATS connection established");
        Ok(Self { client, watch })
    }

    /// Resolves once the client has reconnected after losing the server.
    ///
    /// Subscriptions survive the reconnect, but anything published while the
    /// connection was down is gone.
    pub async fn reconnected(&self) {
        self.watch.reconnected().await;
    }

    /// Publish a JSON-encoded message with NATS headers.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if encoding or publishing fails.
    pub async fn publish_with_headers<T: Serialize>(
        &self,
        subject: &str,
        headers: async_nats::HeaderMap,
        message: &T,
    ) -> Result<(), NetError> {
        let payload = encode(message)?;
        self.client
            .publish_with_headers(subject.to_string(), headers, payload.into())
            .await?;
        Ok(())
    }

    /// Publish a construction command on its subject, with the anti-forgery
    /// and instance headers attached.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::MissingHeader`] if no token is configured, or
    /// another [`NetError`] if encoding or publishing fails.
    pub async fn publish_command(
        &self,
        subjects: &Subjects,
        auth: &CommandAuth,
        command: &EntityCommand,
    ) -> Result<(), NetError> {
        let headers = auth.headers(command.msg_type())?;
        match command {
            EntityCommand::Create(create) => {
                let subject = subjects.entity_create();
                debug!(subject, entity_type = create.entity_type, x = create.x, y = create.y, "publishing create");
                self.publish_with_headers(&subject, headers, create).await
            }
            EntityCommand::Destroy(destroy) => {
                let subject = subjects.entity_destroy();
                debug!(subject, entity_ref = %destroy.entity_id, "publishing destroy");
                self.publish_with_headers(&subject, headers, destroy).await
            }
        }
    }

    /// Send a JSON request and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if encoding, the request, or decoding fails.
    pub async fn request<T, R>(&self, subject: &str, message: &T) -> Result<R, NetError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let payload = encode(message)?;
        let reply = self.client.request(subject.to_string(), payload.into()).await?;
        decode(reply.payload.as_ref())
    }

    /// Subscribe to a subject.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Subscribe`] if the subscription fails.
    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber, NetError> {
        let sub = self.client.subscribe(subject.to_string()).await?;
        info!(subject, "subscribed");
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;
    use crate::messages::{CREATE_MSG_TYPE, CreateEntityCommand};

    #[test]
    fn test_encode_uses_wire_field_names() {
        let cmd = CreateEntityCommand {
            x: 4,
            y: 2,
            entity_type: "House".to_string(),
        };
        let bytes = encode(&cmd).unwrap();
        let value: serde_json::Value = decode(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({"x": 4, "y": 2, "entityType": "House"}));
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result: Result<CreateEntityCommand, _> = decode(b"{not json");
        assert!(matches!(result, Err(NetError::Decode(_))));
    }

    #[test]
    fn test_reconnect_signalled_only_after_loss() {
        let watch = ReconnectWatch::default();
        watch.observe(&Event::Connected);
        assert!(watch.reconnected().now_or_never().is_none());

        watch.observe(&Event::Disconnected);
        watch.observe(&Event::Disconnected);
        watch.observe(&Event::Connected);
        assert!(watch.reconnected().now_or_never().is_some());
        assert!(watch.reconnected().now_or_never().is_none());
    }

    #[test]
    fn test_reconnects_collapse_while_nobody_waits() {
        let watch = ReconnectWatch::default();
        for _ in 0..3 {
            watch.observe(&Event::Disconnected);
            watch.observe(&Event::Connected);
        }
        assert!(watch.reconnected().now_or_never().is_some());
        assert!(watch.reconnected().now_or_never().is_none());
    }

    #[test]
    fn test_headers_require_token() {
        let auth = CommandAuth {
            csrf_token: None,
            instance_id: "inst-1".to_string(),
        };
        assert!(matches!(auth.headers(CREATE_MSG_TYPE), Err(NetError::MissingHeader(_))));

        let empty = CommandAuth {
            csrf_token: Some(String::new()),
            ..auth
        };
        assert!(empty.headers(CREATE_MSG_TYPE).is_err());
    }

    #[test]
    fn test_headers_carry_token_and_instance() {
        let auth = CommandAuth {
            csrf_token: Some("tok-123".to_string()),
            instance_id: "inst-1".to_string(),
        };
        let map = auth.headers(CREATE_MSG_TYPE).unwrap();
        assert_eq!(map.get(headers::CSRF_TOKEN).map(|v| v.as_str()), Some("tok-123"));
        assert_eq!(map.get(headers::MSG_TYPE).map(|v| v.as_str()), Some("create"));
        assert_eq!(map.get(headers::INSTANCE_ID).map(|v| v.as_str()), Some("inst-1"));
    }
}
