//! Dashboard runner: the network loop around a [`DashboardSession`].
//!
//! The runner connects to NATS, bootstraps the grid from a snapshot,
//! subscribes to the three inbound channels and reads operator commands
//! from stdin, carrying out the session's effects as they come. Whenever the
//! connection comes back after a loss the grid is bootstrapped again, since
//! entity events sent during the outage are not redelivered.

use anyhow::Result;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use uuid::Uuid;

use dashboard_grid::EntityRef;
use dashboard_net::connection::CommandAuth;
use dashboard_net::messages::{EntityCommand, EntityDetails, EntityDetailsRequest, GridSnapshot, GridSnapshotRequest};
use dashboard_net::{NatsConnection, Subjects};

use crate::config::DashboardConfig;
use crate::operator::{HELP, OperatorCommand};
use crate::render;
use crate::session::{DashboardSession, Effect};

/// Runs one dashboard instance.
#[derive(Debug)]
pub struct DashboardRunner {
    config: DashboardConfig,
    subjects: Subjects,
    /// Unique instance identifier, sent with every command.
    instance_id: String,
}

impl DashboardRunner {
    /// Create a runner with a fresh instance id.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        let subjects = Subjects::new(config.prefix.clone());
        Self {
            config,
            subjects,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Returns the unique instance ID for this runner.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Credentials attached to outbound commands.
    #[must_use]
    pub fn auth(&self) -> CommandAuth {
        CommandAuth {
            csrf_token: self.config.csrf_token.clone(),
            instance_id: self.instance_id.clone(),
        }
    }

    /// Run until the operator quits or stdin closes.
    ///
    /// 1. Connect to NATS.
    /// 2. Request a grid snapshot and bootstrap from it.
    /// 3. Subscribe to the entity, exchange and log channels.
    /// 4. Loop over channel messages and operator lines, bootstrapping again
    ///    after every reconnect.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a subscription fails, or if
    /// stdin cannot be read. Failed commands and requests are only logged.
    pub async fn run(self) -> Result<()> {
        info!(instance_id = self.instance_id(), prefix = self.subjects.prefix(), "dashboard starting");
        if self.config.csrf_token.is_none() {
            warn!("no anti-forgery token configured; construction commands will be refused");
        }

        let conn = NatsConnection::connect_to(&self.config.nats_url).await?;
        let mut session = DashboardSession::new(self.config.bounds, self.config.catalog.clone());
        self.bootstrap(&conn, &mut session).await;

        let mut entities = conn.subscribe(&self.subjects.entities()).await?;
        let mut exchange = conn.subscribe(&self.subjects.exchange()).await?;
        let mut events = conn.subscribe(&self.subjects.events()).await?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{HELP}");
        loop {
            tokio::select! {
                Some(msg) = entities.next() => {
                    session.on_entity_payload(&msg.payload);
                }
                Some(msg) = exchange.next() => {
                    if let Some(text) = session.on_exchange_payload(&msg.payload) {
                        println!("{text}");
                    }
                }
                Some(msg) = events.next() => {
                    if let Some(text) = session.on_log_payload(&msg.payload) {
                        println!("{text}");
                    }
                }
                () = conn.reconnected() => {
                    info!("reconnected; reloading grid snapshot");
                    self.bootstrap(&conn, &mut session).await;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let command = match line.parse::<OperatorCommand>() {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{e}\n{HELP}");
                            continue;
                        }
                    };
                    match session.handle(command) {
                        Ok(Some(Effect::Quit)) => break,
                        Ok(Some(effect)) => self.carry_out(&conn, effect).await,
                        Ok(None) => {}
                        Err(e) => println!("{e}"),
                    }
                }
                else => break,
            }
        }

        let stats = session.sync().stats();
        info!(
            applied = stats.applied,
            rejected = stats.rejected,
            stale_moves = stats.stale_moves,
            "dashboard shut down"
        );
        Ok(())
    }

    /// Fetch the full grid and replace the session's copy with it. On failure
    /// the session keeps what it had, which is an empty grid at startup.
    async fn bootstrap(&self, conn: &NatsConnection, session: &mut DashboardSession) {
        let subject = self.subjects.grid_snapshot();
        match conn.request::<_, GridSnapshot>(&subject, &GridSnapshotRequest {}).await {
            Ok(snapshot) => session.bootstrap(snapshot),
            Err(e) => warn!(subject, error = %e, "grid snapshot unavailable; keeping current grid"),
        }
    }

    async fn carry_out(&self, conn: &NatsConnection, effect: Effect) {
        match effect {
            Effect::Publish(command) => self.publish(conn, &command).await,
            Effect::Inspect { cell, entity_refs } => {
                if entity_refs.is_empty() {
                    println!("nothing at {cell}");
                }
                for entity_ref in entity_refs {
                    self.inspect(conn, entity_ref).await;
                }
            }
            Effect::Render(text) => println!("{text}"),
            Effect::Quit => {}
        }
    }

    async fn publish(&self, conn: &NatsConnection, command: &EntityCommand) {
        match conn.publish_command(&self.subjects, &self.auth(), command).await {
            Ok(()) => info!(msg_type = command.msg_type(), "command sent"),
            Err(e) => warn!(msg_type = command.msg_type(), error = %e, "command not sent"),
        }
    }

    async fn inspect(&self, conn: &NatsConnection, entity_ref: EntityRef) {
        let subject = self.subjects.entity_details();
        let request = EntityDetailsRequest { entity_id: entity_ref };
        match conn.request::<_, EntityDetails>(&subject, &request).await {
            Ok(details) => println!("{}", render::entity_details(&details)),
            Err(e) => warn!(entity_ref = %request.entity_id, error = %e, "entity details unavailable"),
        }
    }
}
