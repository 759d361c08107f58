//! Team model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tf_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

/// Team entity
///
/// A team has at most one lead. The one-lead invariant (and its mirror: a
/// user may not lead two teams) is enforced at lead-assignment time by the
/// team service, not by this struct.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Option<Id>,

    /// Team name (unique)
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// The team lead, once one has been assigned
    pub lead_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Team {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Team {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Team {
    const TABLE_NAME: &'static str = "teams";
    const TYPE_NAME: &'static str = "Team";
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            lead_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn has_lead(&self) -> bool {
        self.lead_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_new() {
        let team = Team::new("Platform");
        assert_eq!(team.name, "Platform");
        assert!(!team.has_lead());
    }
}
