// Task types and the feature groups each one runs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::groups::FeatureGroup;
use crate::error::InputError;

/// Recording task the speaker performed
///
/// Closed set: the selector decides which feature groups make sense for the
/// material (a held vowel has no words, a /pataka/ run has no stable pitch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Conversation,
    SustainedVowel,
    Ddk,
    Fluency,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::Conversation,
        TaskType::SustainedVowel,
        TaskType::Ddk,
        TaskType::Fluency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Conversation => "conversation",
            TaskType::SustainedVowel => "sustained_vowel",
            TaskType::Ddk => "ddk",
            TaskType::Fluency => "fluency",
        }
    }

    /// Feature groups for this task, not counting transcript-driven ones
    pub fn groups(&self) -> &'static [FeatureGroup] {
        match self {
            TaskType::Conversation => &[
                FeatureGroup::CoreVoice,
                FeatureGroup::Advanced,
                FeatureGroup::Perturbation,
            ],
            TaskType::SustainedVowel => &[
                FeatureGroup::SustainedVowel,
                FeatureGroup::VowelSpace,
                FeatureGroup::Perturbation,
            ],
            TaskType::Ddk => &[FeatureGroup::Rhythm],
            TaskType::Fluency => &[FeatureGroup::CoreVoice, FeatureGroup::Perturbation],
        }
    }

    /// Every key a composition for this task can produce, sorted
    pub fn feature_keys(&self, with_transcript: bool) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .groups()
            .iter()
            .chain(with_transcript.then_some(&FeatureGroup::Temporal))
            .flat_map(|group| group.keys().iter().copied())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| InputError::UnknownTaskType {
                name: s.to_string(),
            })
    }
}
