use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{NpcId, QuestId};

/// Where a quest stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    /// In progress.
    #[default]
    Active,
    /// Finished successfully.
    Completed,
    /// Finished unsuccessfully.
    Failed,
    /// Can no longer be completed.
    Impossible,
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Impossible => "impossible",
        };
        f.write_str(s)
    }
}

/// A quest the player has taken on.
///
/// `completed_objectives` is always a subset of `objectives`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    /// Quest id.
    pub id: QuestId,
    /// Quest title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Current status.
    #[serde(default)]
    pub status: QuestStatus,
    /// NPC who handed out the quest.
    #[serde(default)]
    pub giver_npc_id: Option<NpcId>,
    /// Objectives, in order.
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    completed_objectives: Vec<String>,
    /// Gold promised on completion.
    #[serde(default)]
    pub reward_gold: u32,
    /// Experience promised on completion.
    #[serde(default)]
    pub reward_experience: u32,
}

impl Quest {
    /// Create an active quest with no objectives.
    pub fn new(id: impl Into<QuestId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: QuestStatus::Active,
            giver_npc_id: None,
            objectives: Vec::new(),
            completed_objectives: Vec::new(),
            reward_gold: 0,
            reward_experience: 0,
        }
    }

    /// Add an objective.
    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objectives.push(objective.into());
        self
    }

    /// Objectives already completed.
    pub fn completed_objectives(&self) -> &[String] {
        &self.completed_objectives
    }

    /// Mark an objective complete. Returns false if it is not one of this
    /// quest's objectives; completing it twice is harmless.
    pub fn complete_objective(&mut self, objective: &str) -> bool {
        let Some(found) = self.objectives.iter().find(|o| o.as_str() == objective) else {
            return false;
        };
        if !self.completed_objectives.contains(found) {
            self.completed_objectives.push(found.clone());
        }
        true
    }

    /// Whether every objective is complete.
    pub fn all_objectives_done(&self) -> bool {
        !self.objectives.is_empty() && self.completed_objectives.len() == self.objectives.len()
    }

    /// Drop completed entries that are not objectives. Used after loading.
    pub fn prune_completed(&mut self) -> usize {
        let before = self.completed_objectives.len();
        let objectives = &self.objectives;
        self.completed_objectives.retain(|c| objectives.contains(c));
        before - self.completed_objectives.len()
    }
}

/// Partial quest description as produced by a collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestDraft {
    /// Id; generated when absent.
    pub id: Option<QuestId>,
    /// Quest title.
    pub title: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// NPC who handed out the quest.
    pub giver_npc_id: Option<NpcId>,
    /// Objectives, in order.
    pub objectives: Vec<String>,
    /// Gold reward.
    pub reward_gold: Option<i64>,
    /// Experience reward.
    pub reward_experience: Option<i64>,
}

impl QuestDraft {
    /// Build an active quest, filling gaps with defaults.
    pub fn build(self) -> Quest {
        let mut quest = Quest::new(
            self.id.unwrap_or_else(QuestId::generate),
            self.title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "An unnamed task".to_string()),
        );
        quest.description = self.description.unwrap_or_default();
        quest.giver_npc_id = self.giver_npc_id;
        for objective in self.objectives {
            if !quest.objectives.contains(&objective) {
                quest.objectives.push(objective);
            }
        }
        quest.reward_gold = clamp_reward(self.reward_gold);
        quest.reward_experience = clamp_reward(self.reward_experience);
        quest
    }
}

fn clamp_reward(value: Option<i64>) -> u32 {
    value.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
}
