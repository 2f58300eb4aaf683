use serde::{Deserialize, Serialize};

/// Run state of a strategy instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Running,
    Stopped,
    Error,
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceStatus::Running => write!(f, "running"),
            InstanceStatus::Stopped => write!(f, "stopped"),
            InstanceStatus::Error => write!(f, "error"),
        }
    }
}

/// A trading "instance": one configured bot running a strategy on a symbol.
///
/// Only the fields the dashboard reads are modelled; unknown fields in the
/// backend payload are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub strategy_id: Option<i64>,

    #[serde(default)]
    pub symbol: Option<String>,

    pub status: InstanceStatus,
}

impl Instance {
    pub fn new(id: i64, name: impl Into<String>, status: InstanceStatus) -> Self {
        Self {
            id,
            name: name.into(),
            strategy_id: None,
            symbol: None,
            status,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == InstanceStatus::Running
    }
}
