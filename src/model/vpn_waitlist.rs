use serde::{Deserialize, Serialize};

/// Product-waitlist membership for a contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VpnWaitlist {
    pub geo: Option<String>,
    pub platform: Option<String>,
}
