use serde::{Deserialize, Serialize};

use super::common::Attributes;
use super::EntityId;
use crate::slug::slugify;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(skip)]
    pub id: EntityId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// SkillRank IDs ordered by level; ranks are owned by the skill
    #[serde(default)]
    pub ranks: Vec<EntityId>,
}

/// One level of a skill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRank {
    #[serde(skip)]
    pub id: EntityId,
    /// Owning Skill ID
    pub skill: EntityId,
    pub slug: String,
    pub level: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modifiers: Attributes,
}

impl Skill {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            slug: slugify(&name),
            name,
            ..Default::default()
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
    }
}

impl SkillRank {
    pub fn new(skill: &Skill, level: u8) -> Self {
        Self {
            id: 0,
            skill: skill.id,
            slug: rank_slug(&skill.slug, level),
            level,
            description: String::new(),
            modifiers: Attributes::new(),
        }
    }
}

/// Slug of a rank: `<skill-slug>-rank-<level>`
pub fn rank_slug(skill_slug: &str, level: u8) -> String {
    format!("{}-rank-{}", skill_slug, level)
}
