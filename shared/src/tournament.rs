//! Tournament document model
//!
//! The aggregate root and the race records it owns. Snapshots are plain data:
//! every transition produces a new `Tournament` value rather than mutating
//! one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schedule::Schedule;
use crate::types::{HeatStatus, ParticipantId, TournamentId, TournamentStatus, TournamentType};

/// Identity of a driver as carried through every stage
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub site: String,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            participant_id: id.into(),
            participant_name: name.into(),
            site: site.into(),
        }
    }
}

/// One ranked qualifying time for a site
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierEntry {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    /// Elapsed time in milliseconds
    pub elapsed_ms: u64,
    /// Race the time was set in
    pub race_id: String,
}

impl QualifierEntry {
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        elapsed_ms: u64,
        race_id: impl Into<String>,
    ) -> Self {
        Self {
            participant_id: id.into(),
            participant_name: name.into(),
            elapsed_ms,
            race_id: race_id.into(),
        }
    }

    pub fn into_participant(self, site: &str) -> Participant {
        Participant {
            participant_id: self.participant_id,
            participant_name: self.participant_name,
            site: site.to_string(),
        }
    }
}

/// A driver's slot in a heat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatEntrant {
    #[serde(flatten)]
    pub participant: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

impl HeatEntrant {
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            position: None,
            points: None,
        }
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant.participant_id
    }
}

/// An intermediate race narrowing qualifiers toward the final
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heat {
    pub heat_id: String,
    /// 1-based, unique within a tournament
    pub heat_number: u32,
    pub status: HeatStatus,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_id: Option<String>,
    pub participants: Vec<HeatEntrant>,
}

impl Heat {
    pub fn is_completed(&self) -> bool {
        self.status == HeatStatus::Completed
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.participant_id().clone()).collect()
    }
}

/// A driver's slot in the grand final
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalEntrant {
    #[serde(flatten)]
    pub participant: Participant,
    /// Points carried over from the heats, used for seeding display only
    pub total_points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl FinalEntrant {
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant.participant_id
    }
}

/// The grand final. Heat-shaped, but awards positions only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalHeat {
    pub status: HeatStatus,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race_id: Option<String>,
    pub participants: Vec<FinalEntrant>,
}

impl FinalHeat {
    pub fn is_completed(&self) -> bool {
        self.status == HeatStatus::Completed
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.participant_id().clone()).collect()
    }
}

/// Top three of the grand final
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winners {
    pub first: Participant,
    pub second: Participant,
    pub third: Participant,
}

/// The tournament aggregate root
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub date: DateTime<Utc>,
    pub tournament_type: TournamentType,
    pub status: TournamentStatus,
    pub schedule: Schedule,

    // Configuration
    pub sites_included: Vec<String>,
    pub qualifiers_per_site: u32,
    pub heat_count: u32,

    // Results tracking
    pub qualifying_results: BTreeMap<String, Vec<QualifierEntry>>,
    pub heats: Vec<Heat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_heat: Option<FinalHeat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winners: Option<Winners>,

    /// Bumped by the store on every successful write
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn includes_site(&self, site: &str) -> bool {
        self.sites_included.iter().any(|s| s == site)
    }

    pub fn heat(&self, heat_number: u32) -> Option<&Heat> {
        self.heats.iter().find(|h| h.heat_number == heat_number)
    }

    /// Heat numbers still waiting for results
    pub fn pending_heats(&self) -> Vec<u32> {
        self.heats
            .iter()
            .filter(|h| !h.is_completed())
            .map(|h| h.heat_number)
            .collect()
    }

    pub fn qualifiers_for(&self, site: &str) -> &[QualifierEntry] {
        self.qualifying_results.get(site).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// First tournament that has not reached a terminal status.
///
/// The display and admin layers use this to pick "the" running tournament;
/// the engine itself always takes an explicit id.
pub fn find_active(tournaments: &[Tournament]) -> Option<&Tournament> {
    tournaments.iter().find(|t| !t.status.is_terminal())
}
