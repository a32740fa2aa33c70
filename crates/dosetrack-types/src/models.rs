use serde::{Deserialize, Serialize};

/// A substance the owner logs. Deletable only while no Consumption
/// references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drug {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub notes: Option<String>,
    pub classification: Option<String>,
    pub family: Option<String>,
    pub rarity: Option<String>,
    pub slang: Option<String>,
    pub owner_id: i64,
}

/// Delivery method (oral, insufflated, ...). `icon` is base64 on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub title: String,
    /// Unix seconds.
    pub date: i64,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub rating: Option<i64>,
    pub panic: Option<i64>,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumption {
    pub id: i64,
    pub count: i64,
    /// Unix seconds.
    pub date: i64,
    pub location: String,
    pub drug_id: i64,
    pub method_id: i64,
    pub experience_id: i64,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: i64,
    pub name: String,
    pub consumption_id: i64,
    pub owner_id: i64,
}

/// The caller's own account, without the secret digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    /// Comma-separated recipient addresses.
    pub emergency_contacts: Option<String>,
    pub phone: Option<String>,
    pub days_back: Option<i64>,
    pub favorite_count: Option<i64>,
}

impl UserProfile {
    /// Split the stored contact field into trimmed, non-blank recipients,
    /// preserving their order.
    pub fn contacts(&self) -> Vec<String> {
        self.emergency_contacts
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// -- Composite views --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugSummary {
    pub id: i64,
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSummary {
    pub id: i64,
    pub name: String,
}

/// A Consumption with its drug and method reduced to summaries and its
/// friends inlined. `friends` is empty, never null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionView {
    pub id: i64,
    pub count: i64,
    pub date: i64,
    pub location: String,
    pub experience_id: i64,
    pub owner_id: i64,
    pub drug: DrugSummary,
    pub method: MethodSummary,
    pub friends: Vec<Friend>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceView {
    #[serde(flatten)]
    pub experience: Experience,
    pub consumptions: Vec<ConsumptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugUsage {
    #[serde(flatten)]
    pub drug: Drug,
    pub use_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: i64,
}
