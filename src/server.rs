use serde::Serialize;

use crate::heartbeat::Heartbeat;

/// Normalized view of one discovered cluster member, built fresh from its
/// heartbeat on every query and never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerInfo {
    /// Process id reported by the member.
    pub id: i32,
    pub host: String,
    pub port: u16,
    /// Process startup time, epoch millis.
    pub create_time: i64,
    /// Time of the decoded heartbeat, epoch millis.
    pub last_heartbeat_time: i64,
    /// The original heartbeat JSON, untouched.
    pub raw_info: String,
    /// Fully-qualified store path: `<node type root>/<child key>`.
    pub path: String,
}

impl ServerInfo {
    pub fn from_heartbeat(heartbeat: &Heartbeat, raw: &str, path: &str) -> Self {
        let (id, host, port, create_time, last_heartbeat_time) = match heartbeat {
            Heartbeat::Master(hb) => {
                (hb.process_id, hb.host.clone(), hb.port, hb.startup_time, hb.report_time)
            }
            Heartbeat::Worker(hb) => {
                (hb.process_id, hb.host.clone(), hb.port, hb.startup_time, hb.report_time)
            }
            Heartbeat::Alert(hb) => {
                (hb.process_id, hb.host.clone(), hb.port, hb.startup_time, hb.report_time)
            }
        };
        Self {
            id,
            host,
            port,
            create_time,
            last_heartbeat_time,
            raw_info: raw.to_string(),
            path: path.to_string(),
        }
    }

    /// Under-populated descriptor for a namespace that carries no heartbeat
    /// schema. Only the raw payload and the path are meaningful.
    pub fn bare(raw: &str, path: &str) -> Self {
        Self {
            id: 0,
            host: String::new(),
            port: 0,
            create_time: 0,
            last_heartbeat_time: 0,
            raw_info: raw.to_string(),
            path: path.to_string(),
        }
    }
}
