//! Structural rule table (S001–S007).
//!
//! Pattern-based and approximate on purpose: these rules look for the shape a
//! reactive contract needs and leave type checking to the compiler.

use std::sync::LazyLock;

use regex::Regex;

use super::report::StructuralFinding;
use crate::options::GasEnvelope;

/// Bases a reactive contract may inherit from.
pub const ALLOWED_BASES: [&str; 4] = [
    "IReactive",
    "AbstractReactive",
    "AbstractPausableReactive",
    "AbstractCallback",
];

/// Inputs a rule may consult besides the source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleContext {
    pub gas_envelope: GasEnvelope,
}

pub struct StructuralRule {
    pub code: &'static str,
    pub name: &'static str,
    pub check: fn(&str, &RuleContext) -> Vec<StructuralFinding>,
}

pub const RULES: [StructuralRule; 7] = [
    StructuralRule {
        code: "S001",
        name: "interface-conformance",
        check: s001_interface_conformance,
    },
    StructuralRule {
        code: "S002",
        name: "core-functions",
        check: s002_core_functions,
    },
    StructuralRule {
        code: "S003",
        name: "subscriptions",
        check: s003_subscriptions,
    },
    StructuralRule {
        code: "S004",
        name: "chain-config",
        check: s004_chain_config,
    },
    StructuralRule {
        code: "S005",
        name: "callback-shape",
        check: s005_callback_shape,
    },
    StructuralRule {
        code: "S006",
        name: "address-literals",
        check: s006_address_literals,
    },
    StructuralRule {
        code: "S007",
        name: "gas-limit",
        check: s007_gas_limit,
    },
];

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).expect("static regex"));
    };
}

/// `<type> [visibility] constant [visibility] NAME = VALUE;`
macro_rules! constant_decl {
    ($ty:literal, $name:literal) => {
        concat!(
            r"\b",
            $ty,
            r"\s+(?:(?:private|internal|public)\s+)?constant\s+(?:(?:private|internal|public)\s+)?(",
            $name,
            r")\s*=\s*([^;]*);"
        )
    };
}

pattern!(COMMENT_RE, r"(?s)/\*.*?\*/|//[^\n]*");
pattern!(
    CONTRACT_RE,
    r"(?m)^\s*(abstract\s+)?contract\s+([A-Za-z_$][\w$]*)\s*(?:is\s+([^{]*))?\{"
);
pattern!(REACT_FN_RE, r"\bfunction\s+react\s*\(");
pattern!(RECEIVE_RE, r"\breceive\s*\(\s*\)\s*external\s+payable\b");
pattern!(SUBSCRIBE_CALL_RE, r"\.\s*subscribe\s*\(");
pattern!(TOPIC_CONST_RE, constant_decl!("uint256", r"[\w$]*TOPIC[\w$]*"));
pattern!(CHAIN_ID_CONST_RE, constant_decl!(r"uint\d*", r"[\w$]*CHAIN_ID[\w$]*"));
pattern!(EMIT_CALLBACK_RE, r"\bemit\s+Callback\s*\(([^;]*)\)\s*;");
pattern!(ENCODE_CALL_RE, r"\babi\.encode(?:WithSignature|WithSelector|Call)?\s*\(");
pattern!(ADDRESS_CONST_RE, constant_decl!("address", r"[A-Za-z_$][\w$]*"));
pattern!(GAS_CONST_RE, constant_decl!(r"uint\d*", r"[\w$]*GAS_LIMIT[\w$]*"));
pattern!(BYTES32_HEX_RE, r"^0x[0-9a-fA-F]{64}$");
pattern!(ADDRESS_HEX_RE, r"^0x[0-9a-fA-F]{40}$");
pattern!(IDENT_RE, r"^[A-Za-z_$][\w$]*$");

/// Drop comments so commented-out code neither satisfies nor trips a rule.
pub fn strip_comments(source: &str) -> String {
    COMMENT_RE.replace_all(source, "").into_owned()
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn s001_interface_conformance(source: &str, _: &RuleContext) -> Vec<StructuralFinding> {
    let mut concrete = Vec::new();
    for caps in CONTRACT_RE.captures_iter(source) {
        if caps.get(1).is_some() {
            continue;
        }
        let name = caps[2].to_string();
        let bases: Vec<String> = caps
            .get(3)
            .map(|m| {
                split_top_level(m.as_str())
                    .into_iter()
                    .filter_map(|b| {
                        b.split(|c: char| c == '(' || c.is_whitespace())
                            .find(|s| !s.is_empty())
                            .map(str::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default();
        concrete.push((name, bases));
    }

    if concrete.is_empty() {
        return vec![StructuralFinding::error(
            "S001",
            "interface-conformance",
            "no concrete contract declaration found",
        )];
    }

    let conforms = concrete
        .iter()
        .any(|(_, bases)| bases.iter().any(|b| ALLOWED_BASES.contains(&b.as_str())));
    if conforms {
        return Vec::new();
    }

    let names: Vec<&str> = concrete.iter().map(|(n, _)| n.as_str()).collect();
    vec![StructuralFinding::error(
        "S001",
        "interface-conformance",
        format!(
            "contract {} must inherit from one of: {}",
            names.join(", "),
            ALLOWED_BASES.join(", ")
        ),
    )]
}

fn s002_core_functions(source: &str, _: &RuleContext) -> Vec<StructuralFinding> {
    let mut findings = Vec::new();
    if !REACT_FN_RE.is_match(source) {
        findings.push(StructuralFinding::error(
            "S002",
            "core-functions",
            "missing reaction entry point `function react(LogRecord calldata log)`",
        ));
    }
    if !RECEIVE_RE.is_match(source) {
        findings.push(StructuralFinding::error(
            "S002",
            "core-functions",
            "missing funds-receiving entry point `receive() external payable`",
        ));
    }
    findings
}

fn s003_subscriptions(source: &str, _: &RuleContext) -> Vec<StructuralFinding> {
    let mut findings = Vec::new();
    if !SUBSCRIBE_CALL_RE.is_match(source) {
        findings.push(StructuralFinding::error(
            "S003",
            "subscriptions",
            "no event subscriptions found; the contract would never receive a log",
        ));
    }

    let malformed: Vec<String> = TOPIC_CONST_RE
        .captures_iter(source)
        .filter(|caps| !BYTES32_HEX_RE.is_match(caps[2].trim()))
        .map(|caps| caps[1].to_string())
        .collect();
    if !malformed.is_empty() {
        findings.push(StructuralFinding::error(
            "S003",
            "subscriptions",
            format!(
                "topic constants must be 0x followed by 64 hex digits: {}",
                malformed.join(", ")
            ),
        ));
    }
    findings
}

fn s004_chain_config(source: &str, _: &RuleContext) -> Vec<StructuralFinding> {
    if CHAIN_ID_CONST_RE.is_match(source) {
        return Vec::new();
    }
    vec![StructuralFinding::error(
        "S004",
        "chain-config",
        "no chain id constant declared (e.g. `uint256 private constant ORIGIN_CHAIN_ID = 1;`)",
    )]
}

fn s005_callback_shape(source: &str, _: &RuleContext) -> Vec<StructuralFinding> {
    let emits: Vec<String> = EMIT_CALLBACK_RE
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .collect();

    if emits.is_empty() {
        return vec![StructuralFinding::error(
            "S005",
            "callback-shape",
            "no `emit Callback(...)` statement found",
        )];
    }

    let unencoded = emits
        .iter()
        .filter(|args| !payload_is_encoded(args, source))
        .count();
    if unencoded == 0 {
        return Vec::new();
    }
    vec![StructuralFinding::error(
        "S005",
        "callback-shape",
        format!(
            "{} Callback emission(s) carry a payload not built with abi.encodeWithSignature, \
             abi.encodeWithSelector, abi.encodeCall or abi.encode",
            unencoded
        ),
    )]
}

/// The payload (last argument) is either an inline `abi.encode*` call or a
/// `bytes memory` variable assigned from one.
fn payload_is_encoded(args: &str, source: &str) -> bool {
    let Some(payload) = split_top_level(args).last().map(|s| s.trim()) else {
        return false;
    };
    if ENCODE_CALL_RE.is_match(payload) {
        return true;
    }
    if !IDENT_RE.is_match(payload) {
        return false;
    }
    let assignment = format!(
        r"\bbytes\s+memory\s+{}\s*=\s*abi\.encode(?:WithSignature|WithSelector|Call)?\s*\(",
        regex::escape(payload)
    );
    Regex::new(&assignment).is_ok_and(|re| re.is_match(source))
}

/// Only origin, destination and owner bindings must be literals; helper
/// constants such as `ZERO = address(0)` are left alone.
fn s006_address_literals(source: &str, _: &RuleContext) -> Vec<StructuralFinding> {
    let declared: Vec<(String, String)> = ADDRESS_CONST_RE
        .captures_iter(source)
        .filter(|caps| is_address_binding(&caps[1]))
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect();

    if declared.is_empty() {
        return vec![StructuralFinding::error(
            "S006",
            "address-literals",
            "no address constants declared; at least one origin or destination binding is required",
        )];
    }

    declared
        .into_iter()
        .filter(|(_, value)| !ADDRESS_HEX_RE.is_match(value))
        .map(|(name, value)| {
            StructuralFinding::error(
                "S006",
                "address-literals",
                format!(
                    "address constant {} = {} is not 0x followed by 40 hex digits",
                    name, value
                ),
            )
        })
        .collect()
}

fn is_address_binding(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ["ORIGIN", "DESTINATION", "OWNER"]
        .iter()
        .any(|part| upper.contains(part))
}

fn s007_gas_limit(source: &str, ctx: &RuleContext) -> Vec<StructuralFinding> {
    let envelope = ctx.gas_envelope;
    GAS_CONST_RE
        .captures_iter(source)
        .filter_map(|caps| {
            let name = &caps[1];
            let raw = caps[2].trim();
            match raw.replace('_', "").parse::<u64>() {
                Ok(value) if envelope.contains(value) => None,
                Ok(value) => Some(StructuralFinding::warning(
                    "S007",
                    "gas-limit",
                    format!(
                        "{} = {} is outside the expected range [{}, {}]",
                        name, value, envelope.min, envelope.max
                    ),
                )),
                Err(_) => Some(StructuralFinding::warning(
                    "S007",
                    "gas-limit",
                    format!("{} = {} is not a plain integer literal and was not checked", name, raw),
                )),
            }
        })
        .collect()
}

/// Split on commas that are not nested inside parentheses or string literals.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !s[start..].trim().is_empty() {
        parts.push(&s[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: usize, source: &str) -> Vec<StructuralFinding> {
        (RULES[rule].check)(&strip_comments(source), &RuleContext::default())
    }

    #[test]
    fn rule_codes_are_ordered_and_unique() {
        let codes: Vec<&str> = RULES.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec!["S001", "S002", "S003", "S004", "S005", "S006", "S007"]);
    }

    #[test]
    fn s001_ignores_abstract_bases() {
        let src = "abstract contract AbstractReactive is IReactive {}\ncontract Foo is Ownable {}";
        let findings = run(0, src);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("contract Foo"));
    }

    #[test]
    fn s001_accepts_any_allowed_base() {
        assert!(run(0, "contract Foo is Ownable, AbstractReactive {}").is_empty());
        assert!(run(0, "contract Foo is AbstractPausableReactive(1) {}").is_empty());
    }

    #[test]
    fn s003_aggregates_malformed_topics() {
        let src = format!(
            "x.subscribe(1);\n\
             uint256 private constant EVENT_0_TOPIC_0 = 0x{};\n\
             uint256 private constant EVENT_1_TOPIC_0 = 0x1234;\n\
             uint256 private constant EVENT_2_TOPIC_0 = 42;",
            "ab".repeat(32)
        );
        let findings = run(2, &src);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.ends_with("EVENT_1_TOPIC_0, EVENT_2_TOPIC_0"));
    }

    #[test]
    fn s003_commented_out_subscription_does_not_count() {
        let findings = run(2, "// SERVICE.subscribe(1, a, b, c, d, e);\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("no event subscriptions found"));
    }

    #[test]
    fn s004_accepts_bare_chain_id() {
        assert!(run(3, "uint256 constant CHAIN_ID = 1;").is_empty());
        assert_eq!(run(3, "uint256 chainId = 1;").len(), 1);
    }

    #[test]
    fn s005_payload_must_be_encoded() {
        let ok = "bytes memory payload = abi.encodeWithSignature(\"f(address)\", address(0));\n\
                  emit Callback(1, A, 100, payload);";
        assert!(run(4, ok).is_empty());

        let inline = "emit Callback(1, A, 100, abi.encodeCall(I.f, (address(0), 1)));";
        assert!(run(4, inline).is_empty());

        let raw = "bytes memory payload = hex\"00\";\nemit Callback(1, A, 100, payload);";
        assert_eq!(run(4, raw).len(), 1);

        let packed = "emit Callback(1, A, 100, abi.encodePacked(uint256(1)));";
        assert_eq!(run(4, packed).len(), 1);
    }

    #[test]
    fn s006_names_each_bad_address() {
        let src = format!(
            "address private constant ORIGIN_CONTRACT = 0x{};\n\
             address private constant DESTINATION_CONTRACT = 0x1234;",
            "11".repeat(20)
        );
        let findings = run(5, &src);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("DESTINATION_CONTRACT"));
        assert_eq!(run(5, "contract A {}").len(), 1);
    }

    #[test]
    fn s006_skips_helper_address_constants() {
        let src = format!(
            "address private constant ORIGIN_CONTRACT = 0x{};\n\
             address constant ZERO = address(0);",
            "11".repeat(20)
        );
        assert!(run(5, &src).is_empty());

        let findings = run(5, "address constant ZERO = address(0);");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("no address constants declared"));

        let owner = run(5, "address private constant OWNER = msg.sender;");
        assert_eq!(owner.len(), 1);
        assert!(owner[0].message.contains("OWNER"));
    }

    #[test]
    fn s007_warns_outside_envelope() {
        let ctx = RuleContext {
            gas_envelope: GasEnvelope { min: 100, max: 1_000 },
        };
        assert!(s007_gas_limit("uint64 private constant CALLBACK_GAS_LIMIT = 1_000;", &ctx).is_empty());
        let findings = s007_gas_limit("uint64 private constant CALLBACK_GAS_LIMIT = 5000;", &ctx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, super::super::report::Severity::Warning);
        assert_eq!(
            findings[0].message,
            "CALLBACK_GAS_LIMIT = 5000 is outside the expected range [100, 1000]"
        );
    }

    #[test]
    fn split_respects_nesting_and_strings() {
        assert_eq!(
            split_top_level("1, f(a, b), \"x,y\", z"),
            vec!["1", " f(a, b)", " \"x,y\"", " z"]
        );
    }
}
