//! Character creation and creation-time validation
//!
//! `validate` and `build` are independent: validation reports every issue at
//! once and never fails, while `build` always produces a consistent
//! character, even from options that did not validate.

use super::{Character, ClassCatalog, ClassProfile, HitPoints, ResourceLedger, SkillProficiency};
use crate::ability;
use crate::config::GameConstants;
use crate::types::{Ability, AbilityScores, Defenses, Skill};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A single creation problem, errors and warnings alike
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("character name is required")]
    EmptyName,
    #[error("a class must be selected")]
    MissingClass,
    #[error("unknown class '{class_id}'")]
    UnknownClass { class_id: String },
    #[error("class '{class_id}' cannot wield monarch power")]
    MonarchNotPermitted { class_id: String },
    #[error("ability scores total {total}, outside the usual {min}-{max}")]
    AbilityTotalOutsideBand { total: i32, min: i32, max: i32 },
    #[error("no primary ability of class '{class_id}' is {threshold} or higher")]
    WeakPrimaryAbilities { class_id: String, threshold: i32 },
    #[error("{chosen} skill proficiencies chosen, more than the usual {cap} at level 1")]
    TooManySkills { chosen: usize, cap: usize },
}

/// Result of validating creation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Every message, errors first
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(ToString::to_string)
            .collect()
    }
}

/// Choices made on the creation screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterOptions {
    pub name: String,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub skill_choices: Vec<Skill>,
    /// Skills (among the chosen ones) with expertise
    #[serde(default)]
    pub expertise: Vec<Skill>,
    /// Request monarch power for this character
    #[serde(default)]
    pub monarch_power: bool,
    #[serde(default)]
    pub narrative: Option<String>,
}

impl CharacterOptions {
    pub fn new(name: impl Into<String>, class_id: impl Into<String>) -> Self {
        let class_id = class_id.into();
        CharacterOptions {
            name: name.into(),
            class_id: (!class_id.trim().is_empty()).then_some(class_id),
            ..Default::default()
        }
    }

    /// Selected class id without surrounding whitespace; `None` when blank
    pub fn class_key(&self) -> Option<&str> {
        self.class_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn with_abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = Skill>) -> Self {
        self.skill_choices = skills.into_iter().collect();
        self
    }

    pub fn with_expertise(mut self, skills: impl IntoIterator<Item = Skill>) -> Self {
        self.expertise = skills.into_iter().collect();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = Some(race.into());
        self
    }

    pub fn with_monarch_power(mut self, monarch_power: bool) -> Self {
        self.monarch_power = monarch_power;
        self
    }
}

/// Builds level 1 characters against a class catalog
#[derive(Debug, Clone)]
pub struct CharacterFactory<'a> {
    catalog: &'a ClassCatalog,
    constants: GameConstants,
}

impl<'a> CharacterFactory<'a> {
    pub fn new(catalog: &'a ClassCatalog) -> Self {
        CharacterFactory {
            catalog,
            constants: GameConstants::default(),
        }
    }

    pub fn with_constants(mut self, constants: GameConstants) -> Self {
        self.constants = constants;
        self
    }

    fn profile(&self, options: &CharacterOptions) -> ClassProfile {
        let class_id = options.class_key().unwrap_or_default();
        match self.catalog.get(class_id) {
            Some(profile) => profile.clone(),
            None => {
                warn!(class_id, "class not in catalog, building with fallback profile");
                ClassProfile::fallback(class_id)
            }
        }
    }

    /// Build a level 1 character with full pools and no gear
    pub fn build(&self, options: &CharacterOptions) -> Character {
        let profile = self.profile(options);
        let level = 1;
        let vit_mod = ability::modifier(options.abilities.vitality);
        let max_hp = ability::hit_points_at_level1(profile.hit_die, vit_mod);

        let mut skills: Vec<SkillProficiency> = Vec::new();
        for skill in &options.skill_choices {
            if skills.iter().any(|s| s.skill == *skill) {
                continue;
            }
            skills.push(SkillProficiency {
                skill: *skill,
                proficient: true,
                expertise: options.expertise.contains(skill),
            });
        }

        let mut resources = ResourceLedger::new(
            ability::favor_pool_max(level),
            ability::spell_slot_maxima(profile.caster, level),
        );
        resources.monarch_active = options.monarch_power && profile.allows_monarch;

        let character = Character {
            name: options.name.trim().to_string(),
            level,
            class_id: profile.id.clone(),
            path: options.path.clone(),
            race: options.race.clone(),
            background: options.background.clone(),
            abilities: options.abilities,
            skills,
            saving_throws: profile.saving_throws.clone(),
            hit_points: HitPoints::full(max_hp),
            hit_die: profile.hit_die,
            armor_class: ability::armor_class(
                ability::modifier(options.abilities.agility),
                Default::default(),
                false,
            ),
            speed: profile.speed.unwrap_or(self.constants.progression.default_speed),
            defenses: Defenses::default(),
            caster: profile.caster,
            spellcasting_ability: profile.spellcasting_ability,
            resources,
            known_powers: Vec::new(),
            equipment: Vec::new(),
            allies: Vec::new(),
            runes: Vec::new(),
            narrative: options.narrative.clone(),
        };

        debug!(
            name = %character.name,
            class_id = %character.class_id,
            max_hp,
            armor_class = character.armor_class,
            "built character"
        );
        character
    }

    /// Check creation options; never fails, collects every issue
    pub fn validate(&self, options: &CharacterOptions) -> ValidationReport {
        let creation = &self.constants.creation;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if options.name.trim().is_empty() {
            errors.push(ValidationIssue::EmptyName);
        }

        let profile = match options.class_key() {
            None => {
                errors.push(ValidationIssue::MissingClass);
                None
            }
            Some(class_id) => {
                let profile = self.catalog.get(class_id);
                if profile.is_none() {
                    errors.push(ValidationIssue::UnknownClass {
                        class_id: class_id.to_string(),
                    });
                }
                profile
            }
        };

        if let Some(profile) = profile {
            if options.monarch_power && !profile.allows_monarch {
                errors.push(ValidationIssue::MonarchNotPermitted {
                    class_id: profile.id.clone(),
                });
            }
        }

        let total = options.abilities.total();
        if total < creation.ability_total_min || total > creation.ability_total_max {
            warnings.push(ValidationIssue::AbilityTotalOutsideBand {
                total,
                min: creation.ability_total_min,
                max: creation.ability_total_max,
            });
        }

        if let Some(profile) = profile {
            let strong_primary = profile
                .primary_abilities
                .iter()
                .any(|a: &Ability| options.abilities.get(*a) >= creation.primary_ability_threshold);
            if !profile.primary_abilities.is_empty() && !strong_primary {
                warnings.push(ValidationIssue::WeakPrimaryAbilities {
                    class_id: profile.id.clone(),
                    threshold: creation.primary_ability_threshold,
                });
            }
        }

        if options.skill_choices.len() > creation.skill_soft_cap {
            warnings.push(ValidationIssue::TooManySkills {
                chosen: options.skill_choices.len(),
                cap: creation.skill_soft_cap,
            });
        }

        debug!(errors = errors.len(), warnings = warnings.len(), "validated character options");
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
