//! Template library: static skeletons plus placeholder substitution.
//!
//! Stateless. Knows nothing about automation configs beyond the four flags
//! used to pick a variant.

pub mod render;
pub mod skeletons;

use serde::Serialize;

use crate::config::AutomationConfig;
use crate::error::GenerationError;
pub use render::{Placeholder, PlaceholderValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    BasicSinglePair,
    MultiPair,
    OwnerGated,
    Pausable,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::BasicSinglePair => "basic-single-pair",
            TemplateId::MultiPair => "multi-pair",
            TemplateId::OwnerGated => "owner-gated",
            TemplateId::Pausable => "pausable",
        }
    }

    pub fn skeleton(&self) -> &'static str {
        match self {
            TemplateId::BasicSinglePair => skeletons::BASIC_SINGLE_PAIR,
            TemplateId::MultiPair => skeletons::MULTI_PAIR,
            TemplateId::OwnerGated => skeletons::OWNER_GATED,
            TemplateId::Pausable => skeletons::PAUSABLE,
        }
    }

    /// Placeholders this variant's skeleton references.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        render::referenced(self.skeleton())
            .iter()
            .filter_map(|name| Placeholder::from_name(name))
            .collect()
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pausable wins over owner-gated, which wins over multi-pair.
pub fn select_template(config: &AutomationConfig) -> TemplateId {
    if config.is_pausable {
        TemplateId::Pausable
    } else if config.owner_address.is_some() {
        TemplateId::OwnerGated
    } else if config.pairs.len() > 1 {
        TemplateId::MultiPair
    } else {
        TemplateId::BasicSinglePair
    }
}

/// Render `template` with `values`. Every referenced placeholder must be supplied.
pub fn render(template: TemplateId, values: &PlaceholderValues) -> Result<String, GenerationError> {
    render::render(template.skeleton(), values).map_err(|missing| {
        GenerationError::MissingPlaceholder {
            template: template.as_str(),
            placeholder: missing.0,
        }
    })
}
