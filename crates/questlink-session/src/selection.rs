//! Operator input: the pending action and the two target slots.

use std::fmt;
use std::str::FromStr;

use questlink_protocol::ActionType;

use crate::SessionError;

// ---------------------------------------------------------------------------
// PendingAction
// ---------------------------------------------------------------------------

/// The action the operator has chosen for the next submission.
///
/// Exactly one is selected at a time. The operator-facing names differ from
/// the wire verbs; [`action_type`](Self::action_type) maps between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PendingAction {
    #[default]
    Observe,
    Traverse,
    Acquire,
    Deposit,
    Speak,
}

impl PendingAction {
    /// All actions, in the order a picker lists them.
    pub const ALL: [PendingAction; 5] = [
        Self::Observe,
        Self::Traverse,
        Self::Acquire,
        Self::Deposit,
        Self::Speak,
    ];

    /// The wire verb for this action.
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Observe => ActionType::View,
            Self::Traverse => ActionType::Enter,
            Self::Acquire => ActionType::Take,
            Self::Deposit => ActionType::Put,
            Self::Speak => ActionType::Send,
        }
    }

    /// Returns `true` if the secondary target is free text, not an item id.
    pub fn takes_speech(&self) -> bool {
        matches!(self, Self::Speak)
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Observe => "observe",
            Self::Traverse => "traverse",
            Self::Acquire => "acquire",
            Self::Deposit => "deposit",
            Self::Speak => "speak",
        };
        f.write_str(name)
    }
}

/// Parses the action names and the wire verbs (`"look"` for observe too).
impl FromStr for PendingAction {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "observe" | "view" | "look" => Ok(Self::Observe),
            "traverse" | "enter" => Ok(Self::Traverse),
            "acquire" | "take" => Ok(Self::Acquire),
            "deposit" | "put" => Ok(Self::Deposit),
            "speak" | "send" | "say" => Ok(Self::Speak),
            other => Err(SessionError::UnknownAction(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which target slot an item is being selected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    /// An object from the surroundings (`target_1`).
    Primary,
    /// An object from the inventory (`target_2`).
    Secondary,
}

/// The item ids the next action binds to.
///
/// Each slot holds at most one id. Selecting the id a slot already holds
/// clears the slot; selecting a different id replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

impl Selection {
    /// Toggles `id` in `slot`.
    pub fn toggle(&mut self, slot: TargetSlot, id: impl Into<String>) {
        let id = id.into();
        let current = self.slot_mut(slot);
        if current.as_deref() == Some(id.as_str()) {
            *current = None;
        } else {
            *current = Some(id);
        }
    }

    /// Returns the id held by `slot`.
    pub fn get(&self, slot: TargetSlot) -> Option<&str> {
        match slot {
            TargetSlot::Primary => self.primary.as_deref(),
            TargetSlot::Secondary => self.secondary.as_deref(),
        }
    }

    /// Empties both slots.
    pub fn clear(&mut self) {
        self.primary = None;
        self.secondary = None;
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }

    fn slot_mut(&mut self, slot: TargetSlot) -> &mut Option<String> {
        match slot {
            TargetSlot::Primary => &mut self.primary,
            TargetSlot::Secondary => &mut self.secondary,
        }
    }
}
