//! Plain-data snapshots exchanged with persistence and backups

use super::Character;
use crate::types::{AbilityScores, Skill};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot decoding error
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Inconsistent snapshot: {0}")]
    Inconsistent(String),
}

impl Character {
    /// Full snapshot as JSON; saves always replace the whole record
    pub fn to_snapshot_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a full snapshot, rejecting records that break invariants
    pub fn from_snapshot_json(json: &str) -> Result<Character, SnapshotError> {
        let character: Character = serde_json::from_str(json)?;
        character.check_invariants()?;
        Ok(character)
    }

    fn check_invariants(&self) -> Result<(), SnapshotError> {
        if self.level == 0 {
            return Err(SnapshotError::Inconsistent("level must be at least 1".to_string()));
        }
        let hp = &self.hit_points;
        if hp.current < 0 || hp.temporary < 0 || hp.current > hp.max.max(0) {
            return Err(SnapshotError::Inconsistent(format!(
                "hit points {}/{} (+{}) out of range",
                hp.current, hp.max, hp.temporary
            )));
        }
        if self.resources.favor > self.favor_max() {
            return Err(SnapshotError::Inconsistent(format!(
                "favor {} exceeds level {} maximum {}",
                self.resources.favor,
                self.level,
                self.favor_max()
            )));
        }
        Ok(())
    }

    /// Reduced template used for backups and sharing builds
    pub fn to_template(&self) -> CharacterTemplate {
        CharacterTemplate::from(self)
    }
}

/// Subset of a character kept by the template variant of a backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub name: String,
    pub class_id: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    pub level: u32,
    pub abilities: AbilityScores,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub narrative: Option<String>,
}

impl From<&Character> for CharacterTemplate {
    fn from(character: &Character) -> Self {
        CharacterTemplate {
            name: character.name.clone(),
            class_id: character.class_id.clone(),
            path: character.path.clone(),
            background: character.background.clone(),
            level: character.level,
            abilities: character.abilities,
            skills: character
                .skills
                .iter()
                .filter(|s| s.proficient)
                .map(|s| s.skill)
                .collect(),
            narrative: character.narrative.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::character;
    use super::*;

    #[test]
    fn test_snapshot_restores_equal_character() {
        let original = character("wizard", AbilityScores::uniform(13));
        let json = original.to_snapshot_json().unwrap();
        let restored = Character::from_snapshot_json(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_snapshot_rejects_broken_hit_points() {
        let mut broken = character("fighter", AbilityScores::uniform(10));
        broken.hit_points.current = broken.hit_points.max + 5;
        let json = serde_json::to_string(&broken).unwrap();
        assert!(matches!(
            Character::from_snapshot_json(&json),
            Err(SnapshotError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_garbage() {
        assert!(matches!(
            Character::from_snapshot_json("{\"name\": 3}"),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_template_keeps_identity_only() {
        let mut c = character("hunter", AbilityScores::uniform(12));
        c.narrative = Some("Weakest hunter of mankind".to_string());
        let template = c.to_template();
        assert_eq!(template.class_id, "hunter");
        assert_eq!(template.level, 1);
        assert_eq!(template.narrative.as_deref(), Some("Weakest hunter of mankind"));

        let json = serde_json::to_value(&template).unwrap();
        assert!(json.get("resources").is_none());
    }
}
