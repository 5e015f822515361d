//! Placeholder substitution.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("static regex"));

/// Every placeholder name a skeleton may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    Pragma,
    ContractName,
    ChainConstants,
    AddressConstants,
    OwnerConstant,
    GasLimit,
    PairCount,
    EventConstants,
    StateVariables,
    ConstructorLogic,
    Subscriptions,
    Unsubscriptions,
    ReactGuard,
    ReactLogic,
}

impl Placeholder {
    pub const ALL: [Placeholder; 14] = [
        Placeholder::Pragma,
        Placeholder::ContractName,
        Placeholder::ChainConstants,
        Placeholder::AddressConstants,
        Placeholder::OwnerConstant,
        Placeholder::GasLimit,
        Placeholder::PairCount,
        Placeholder::EventConstants,
        Placeholder::StateVariables,
        Placeholder::ConstructorLogic,
        Placeholder::Subscriptions,
        Placeholder::Unsubscriptions,
        Placeholder::ReactGuard,
        Placeholder::ReactLogic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placeholder::Pragma => "PRAGMA",
            Placeholder::ContractName => "CONTRACT_NAME",
            Placeholder::ChainConstants => "CHAIN_CONSTANTS",
            Placeholder::AddressConstants => "ADDRESS_CONSTANTS",
            Placeholder::OwnerConstant => "OWNER_CONSTANT",
            Placeholder::GasLimit => "GAS_LIMIT",
            Placeholder::PairCount => "PAIR_COUNT",
            Placeholder::EventConstants => "EVENT_CONSTANTS",
            Placeholder::StateVariables => "STATE_VARIABLES",
            Placeholder::ConstructorLogic => "CONSTRUCTOR_LOGIC",
            Placeholder::Subscriptions => "SUBSCRIPTIONS",
            Placeholder::Unsubscriptions => "UNSUBSCRIPTIONS",
            Placeholder::ReactGuard => "REACT_GUARD",
            Placeholder::ReactLogic => "REACT_LOGIC",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Placeholder::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered fragment for each placeholder.
pub type PlaceholderValues = BTreeMap<Placeholder, String>;

/// A placeholder the skeleton references but that has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPlaceholder(pub String);

/// Placeholder names referenced by `skeleton`, in first-appearance order.
pub fn referenced(skeleton: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(skeleton) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Substitute every `{{NAME}}` in `skeleton`.
///
/// A line consisting only of a placeholder whose value is empty is dropped,
/// along with one of the blank lines that would otherwise double up around it.
pub fn render(skeleton: &str, values: &PlaceholderValues) -> Result<String, MissingPlaceholder> {
    for name in referenced(skeleton) {
        let supplied = Placeholder::from_name(&name).is_some_and(|p| values.contains_key(&p));
        if !supplied {
            return Err(MissingPlaceholder(name));
        }
    }

    let lookup = |name: &str| -> &str {
        Placeholder::from_name(name)
            .and_then(|p| values.get(&p))
            .map(String::as_str)
            .unwrap_or_default()
    };

    let mut out = String::with_capacity(skeleton.len() * 2);
    let mut last_blank = false;
    let mut skip_blank = false;

    for line in skeleton.split_inclusive('\n') {
        let body = line.trim_end_matches('\n');

        if skip_blank && body.is_empty() {
            skip_blank = false;
            continue;
        }
        skip_blank = false;

        if let Some(caps) = PLACEHOLDER_RE.captures(body.trim()) {
            let whole_line = caps.get(0).is_some_and(|m| m.as_str() == body.trim());
            if whole_line && lookup(&caps[1]).is_empty() {
                skip_blank = last_blank;
                continue;
            }
        }

        let rendered = PLACEHOLDER_RE.replace_all(line, |caps: &regex::Captures| lookup(&caps[1]).to_string());
        last_blank = body.is_empty();
        out.push_str(&rendered);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(Placeholder, &str)]) -> PlaceholderValues {
        pairs.iter().map(|(p, v)| (*p, v.to_string())).collect()
    }

    #[test]
    fn substitutes_inline_and_whole_line() {
        let out = render(
            "contract {{CONTRACT_NAME}} {\n{{REACT_LOGIC}}\n}\n",
            &values(&[
                (Placeholder::ContractName, "Foo"),
                (Placeholder::ReactLogic, "    x = 1;"),
            ]),
        )
        .unwrap();
        assert_eq!(out, "contract Foo {\n    x = 1;\n}\n");
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = render(
            "{{CONTRACT_NAME}} {{GAS_LIMIT}}",
            &values(&[(Placeholder::ContractName, "Foo")]),
        )
        .unwrap_err();
        assert_eq!(err, MissingPlaceholder("GAS_LIMIT".into()));
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let err = render("{{NOT_A_THING}}", &PlaceholderValues::new()).unwrap_err();
        assert_eq!(err, MissingPlaceholder("NOT_A_THING".into()));
    }

    #[test]
    fn empty_whole_line_placeholder_collapses_blank_lines() {
        let out = render(
            "a\n\n{{OWNER_CONSTANT}}\n\nb\n",
            &values(&[(Placeholder::OwnerConstant, "")]),
        )
        .unwrap();
        assert_eq!(out, "a\n\nb\n");
    }

    #[test]
    fn referenced_lists_each_name_once() {
        assert_eq!(
            referenced("{{A_B}} {{C}} {{A_B}}"),
            vec!["A_B".to_string(), "C".to_string()]
        );
    }
}
