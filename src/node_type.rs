use std::fmt;

/// Category of cluster member, each owning one reserved root path in the
/// coordination store. `FailoverFinishNodes` is not a server category but the
/// namespace where failover completion markers are parked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Master,
    Worker,
    AlertServer,
    FailoverFinishNodes,
}

impl NodeType {
    /// Every reserved namespace, in bootstrap order.
    pub const ALL: [NodeType; 4] = [
        NodeType::Master,
        NodeType::Worker,
        NodeType::AlertServer,
        NodeType::FailoverFinishNodes,
    ];

    /// The fixed root path this node type owns in the store.
    pub fn registry_path(&self) -> &'static str {
        match self {
            NodeType::Master => "/nodes/master",
            NodeType::Worker => "/nodes/worker",
            NodeType::AlertServer => "/nodes/alert-server",
            NodeType::FailoverFinishNodes => "/failover/finish-nodes",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Master => "master",
            NodeType::Worker => "worker",
            NodeType::AlertServer => "alert-server",
            NodeType::FailoverFinishNodes => "failover-finish-nodes",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
