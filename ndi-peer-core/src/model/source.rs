use serde::{Deserialize, Serialize};

/// One NDI source visible on the network, as reported by `findNDISources`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdiSource {
    pub name: String,
    pub ip: String,
}
