use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::streams::SubscriptionRegistry;

/// Wire form: `{"type":"subscribe","accountId":5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QueueCommand {
    Subscribe {
        #[serde(rename = "accountId")]
        account_id: i64,
    },
    Unsubscribe {
        #[serde(rename = "accountId")]
        account_id: i64,
    },
}

/// What a payload turned into; the payload is acknowledged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Command(QueueCommand),
    Dropped,
}

pub fn parse_command(payload: &str) -> Option<QueueCommand> {
    match serde_json::from_str(payload) {
        Ok(command) => Some(command),
        Err(err) => {
            warn!(error = %err, payload, "dropping unrecognised queue message");
            None
        }
    }
}

/// Apply one payload to the registry. Returns once registration was
/// attempted; stream failures surface in the reader tasks' logs.
pub fn dispatch_payload(registry: &SubscriptionRegistry, payload: &str) -> Dispatched {
    let Some(command) = parse_command(payload) else {
        return Dispatched::Dropped;
    };
    info!(?command, "queue command");
    match command {
        QueueCommand::Subscribe { account_id } => registry.start(account_id),
        QueueCommand::Unsubscribe { account_id } => registry.stop(account_id),
    }
    Dispatched::Command(command)
}
