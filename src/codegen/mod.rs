//! Codegen pass: AutomationConfig → Solidity source.
//!
//! Public API: `generate(config) -> Result<GeneratedSource, GenerationError>`

mod constants;
mod reactions;
mod subscriptions;
pub mod topic;
pub mod writer;

use std::collections::HashMap;

use serde::Serialize;

use crate::config::{AutomationConfig, EventFunctionPair, Topic};
use crate::error::GenerationError;
use crate::template::{self, Placeholder, PlaceholderValues, TemplateId};

/// Generated contract source. Never mutated after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSource {
    template: TemplateId,
    contract_name: String,
    text: String,
}

impl GeneratedSource {
    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// A pair with its resolved topic-0 and the constant name bound to it.
pub(crate) struct PlannedPair<'a> {
    pub index: usize,
    pub pair: &'a EventFunctionPair,
    pub topic: Topic,
    pub constant: String,
}

/// Generate the contract source for a validated config.
pub fn generate(config: &AutomationConfig) -> Result<GeneratedSource, GenerationError> {
    let planned = plan_pairs(config)?;
    let template = template::select_template(config);
    tracing::debug!(
        template = %template,
        pairs = planned.len(),
        contract = %config.contract_name,
        "generating contract source"
    );

    let values = placeholder_values(template, config, &planned)?;
    let text = template::render(template, &values)?;

    Ok(GeneratedSource {
        template,
        contract_name: config.contract_name.clone(),
        text,
    })
}

/// Resolve topic-0 for each pair, rejecting any topic claimed twice.
///
/// With first-match-wins dispatch a repeated topic would silently shadow the
/// later pair, so it is an error whether the repeat comes from a duplicated
/// signature, an explicit `topic0`, or a hash collision.
fn plan_pairs(config: &AutomationConfig) -> Result<Vec<PlannedPair<'_>>, GenerationError> {
    if config.pairs.is_empty() {
        return Err(GenerationError::NoPairs);
    }

    let mut seen: HashMap<Topic, usize> = HashMap::new();
    let mut planned = Vec::with_capacity(config.pairs.len());

    for (index, pair) in config.pairs.iter().enumerate() {
        let topic = pair.topic0.unwrap_or_else(|| topic::event_topic(&pair.event));
        if let Some(&first) = seen.get(&topic) {
            return Err(GenerationError::DuplicateTopic {
                topic: topic.to_string(),
                first,
                second: index,
            });
        }
        seen.insert(topic, index);
        planned.push(PlannedPair {
            index,
            pair,
            topic,
            constant: format!("EVENT_{}_TOPIC_0", index),
        });
    }

    Ok(planned)
}

/// Compute a value for every placeholder the chosen skeleton references.
fn placeholder_values(
    template: TemplateId,
    config: &AutomationConfig,
    planned: &[PlannedPair<'_>],
) -> Result<PlaceholderValues, GenerationError> {
    let mut values = PlaceholderValues::new();

    for placeholder in template.placeholders() {
        let value = match placeholder {
            Placeholder::Pragma => config.pragma.clone(),
            Placeholder::ContractName => config.contract_name.clone(),
            Placeholder::ChainConstants => constants::emit_chain_constants(config),
            Placeholder::AddressConstants => constants::emit_address_constants(config),
            Placeholder::OwnerConstant => constants::emit_owner_constant(config),
            Placeholder::GasLimit => config.gas_limit.to_string(),
            Placeholder::PairCount => planned.len().to_string(),
            Placeholder::EventConstants => constants::emit_event_constants(planned),
            Placeholder::StateVariables => constants::emit_state_variables(),
            Placeholder::ConstructorLogic => constants::emit_constructor_logic(),
            Placeholder::Subscriptions => subscriptions::emit_subscriptions(planned, "subscribe"),
            Placeholder::Unsubscriptions => {
                subscriptions::emit_subscriptions(planned, "unsubscribe")
            }
            Placeholder::ReactGuard => reactions::emit_react_guard(config),
            Placeholder::ReactLogic => reactions::emit_react_logic(planned, config)?,
        };
        values.insert(placeholder, value);
    }

    Ok(values)
}
