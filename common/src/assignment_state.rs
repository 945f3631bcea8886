use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, VariantNames};

/// Assignment state machine
///
/// Valid state transitions:
/// - WaitingForAcceptance -> Accepted, Declined
/// - Accepted and Declined are terminal states
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumIter,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AssignmentState {
    /// Created by an admin, the assignee has not answered yet
    WaitingForAcceptance,
    /// The assignee took the asset
    Accepted,
    /// The assignee refused the asset (terminal)
    Declined,
}

impl AssignmentState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: AssignmentState) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Terminal states accept no further transition
    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// A valid assignment still ties the asset to its assignee
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            AssignmentState::WaitingForAcceptance | AssignmentState::Accepted
        )
    }

    /// Returns all valid transitions from this state
    pub fn valid_transitions(&self) -> &'static [AssignmentState] {
        use AssignmentState::*;
        match self {
            WaitingForAcceptance => &[Accepted, Declined],
            Accepted | Declined => &[],
        }
    }
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
