use serde::Deserialize;

/// One controller payload: one reporting node, many observed devices.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeBatch {
    pub network_id: NetworkId,
    pub node_mac: String,
    /// Vendor protocol version. Carried by real controllers, not used.
    #[serde(default)]
    pub version: Option<u32>,
    pub probe_requests: Vec<ProbeEntry>,
}

/// Per-device stats as aggregated by the reporting node.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeEntry {
    pub mac: String,
    pub count: i32,
    pub min_signal: i32,
    pub max_signal: i32,
    pub avg_signal: i32,
    pub first_seen: i64,
    pub last_seen: i64,
    pub associated: bool,
}

/// Deployments report their id either as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NetworkId {
    Number(i64),
    Text(String),
}

impl NetworkId {
    pub fn into_string(self) -> String {
        match self {
            NetworkId::Number(n) => n.to_string(),
            NetworkId::Text(s) => s,
        }
    }
}
