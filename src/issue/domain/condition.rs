//! Typed status conditions projected onto declared issues.

use super::ParseConditionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition kinds tracked on a declared issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// Whether the remote issue is open.
    #[serde(rename = "IsOpen")]
    IsOpen,
    /// Whether a pull request is linked to the remote issue.
    #[serde(rename = "HasPR")]
    HasPr,
}

impl ConditionType {
    /// Returns the persisted type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IsOpen => "IsOpen",
            Self::HasPr => "HasPR",
        }
    }
}

impl TryFrom<&str> for ConditionType {
    type Error = ParseConditionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "IsOpen" => Ok(Self::IsOpen),
            "HasPR" => Ok(Self::HasPr),
            _ => Err(ParseConditionError(value.to_owned())),
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    /// The condition holds.
    True,
    /// The condition does not hold.
    False,
    /// The condition could not be determined.
    Unknown,
}

impl ConditionStatus {
    /// Returns the persisted status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::True => "True",
            Self::False => "False",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl TryFrom<&str> for ConditionStatus {
    type Error = ParseConditionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "True" => Ok(Self::True),
            "False" => Ok(Self::False),
            "Unknown" => Ok(Self::Unknown),
            _ => Err(ParseConditionError(value.to_owned())),
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted condition entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition kind; unique within a [`ConditionSet`].
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    /// Current value.
    pub status: ConditionStatus,
    /// Short reason for the current value.
    pub reason: String,
    /// Human-readable detail.
    pub message: String,
    /// When `status` last changed.
    pub last_transition_time: DateTime<Utc>,
}

/// Desired condition value before it is merged into a [`ConditionSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionUpdate {
    /// Condition kind.
    pub condition_type: ConditionType,
    /// Desired value.
    pub status: ConditionStatus,
    /// Short reason for the value.
    pub reason: String,
    /// Human-readable detail.
    pub message: String,
}

impl ConditionUpdate {
    /// Creates a condition update.
    #[must_use]
    pub fn new(
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type,
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }
}

/// Condition list keyed by [`ConditionType`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(Vec<Condition>);

impl ConditionSet {
    /// Creates an empty condition set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the condition of the given type, if present.
    #[must_use]
    pub fn get(&self, condition_type: ConditionType) -> Option<&Condition> {
        self.0
            .iter()
            .find(|condition| condition.condition_type == condition_type)
    }

    /// Returns the status of the given type, if present.
    #[must_use]
    pub fn status_of(&self, condition_type: ConditionType) -> Option<ConditionStatus> {
        self.get(condition_type).map(|condition| condition.status)
    }

    /// Returns `true` when the given condition is present and `True`.
    #[must_use]
    pub fn is_true(&self, condition_type: ConditionType) -> bool {
        self.status_of(condition_type) == Some(ConditionStatus::True)
    }

    /// Merges `update` into the set.
    ///
    /// A condition whose status already equals the update's status is left
    /// untouched. Otherwise the entry is replaced and its transition time set
    /// to `now`. Returns whether the set changed.
    pub fn upsert(&mut self, update: ConditionUpdate, now: DateTime<Utc>) -> bool {
        let existing = self
            .0
            .iter_mut()
            .find(|condition| condition.condition_type == update.condition_type);

        match existing {
            Some(condition) if condition.status == update.status => false,
            Some(condition) => {
                condition.status = update.status;
                condition.reason = update.reason;
                condition.message = update.message;
                condition.last_transition_time = now;
                true
            }
            None => {
                self.0.push(Condition {
                    condition_type: update.condition_type,
                    status: update.status,
                    reason: update.reason,
                    message: update.message,
                    last_transition_time: now,
                });
                true
            }
        }
    }

    /// Merges every update, returning whether any of them changed the set.
    pub fn apply(
        &mut self,
        updates: impl IntoIterator<Item = ConditionUpdate>,
        now: DateTime<Utc>,
    ) -> bool {
        updates
            .into_iter()
            .fold(false, |changed, update| self.upsert(update, now) || changed)
    }

    /// Iterates over the conditions.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    /// Returns the number of conditions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no condition is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
