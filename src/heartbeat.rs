//! Per-node-type heartbeat schemas.
//!
//! Each cluster member periodically writes a JSON liveness record into its
//! own ephemeral node. The schemas below decode only the fields this crate
//! consumes; node-type-specific extras stay in the raw payload carried on
//! the resulting [`ServerInfo`](crate::ServerInfo).

use serde::{Deserialize, Serialize};

use crate::node_type::NodeType;

/// Liveness record written by a master process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MasterHeartbeat {
    /// Process start, epoch millis.
    pub startup_time: i64,
    /// Time this heartbeat was reported, epoch millis.
    pub report_time: i64,
    pub process_id: i32,
    pub host: String,
    pub port: u16,
}

/// Liveness record written by a worker process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerHeartbeat {
    pub startup_time: i64,
    pub report_time: i64,
    pub process_id: i32,
    pub host: String,
    pub port: u16,
}

/// Liveness record written by the alerting service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertHeartbeat {
    pub startup_time: i64,
    pub report_time: i64,
    pub process_id: i32,
    pub host: String,
    pub port: u16,
}

/// A decoded heartbeat, tagged by the node type that produced it.
///
/// Decoding dispatches exhaustively on [`NodeType`], so adding a node type
/// will not compile until its schema and decode arm exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Heartbeat {
    Master(MasterHeartbeat),
    Worker(WorkerHeartbeat),
    Alert(AlertHeartbeat),
}

impl Heartbeat {
    /// Decode a raw payload per the node type's schema.
    ///
    /// The failover namespace stores timestamps, not heartbeats, so it has
    /// no schema and decodes to `Ok(None)`.
    pub fn decode(node_type: NodeType, raw: &str) -> Result<Option<Self>, serde_json::Error> {
        let heartbeat = match node_type {
            NodeType::Master => Some(Heartbeat::Master(serde_json::from_str(raw)?)),
            NodeType::Worker => Some(Heartbeat::Worker(serde_json::from_str(raw)?)),
            NodeType::AlertServer => Some(Heartbeat::Alert(serde_json::from_str(raw)?)),
            NodeType::FailoverFinishNodes => None,
        };
        Ok(heartbeat)
    }
}
