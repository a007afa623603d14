//! Closed expression mini-language for "save this file?" conditions on
//! season/episode numbers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::types::MediaInfo;
use super::{RenameError, Result};

/// Record field a rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleField {
    Season,
    Episode,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
}

impl RuleOp {
    fn compare(self, left: u32, right: u32) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Eq => left == right,
        }
    }
}

/// A single save condition, e.g. "episode > 90".
///
/// Both input surfaces, the structured `{type, symbol, value}` form and the
/// legacy `"episode>90"` strings, parse into this one type; there is a single
/// evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRule {
    pub field: RuleField,
    pub op: RuleOp,
    pub value: u32,
}

impl SaveRule {
    /// Build from the structured front-end. `rule_type` accepts both the
    /// placeholder spellings (`{E}`, `{S}`) and the plain field names.
    pub fn from_parts(rule_type: &str, symbol: &str, value: u32) -> Result<Self> {
        let field = match rule_type {
            "{E}" | "episode" => RuleField::Episode,
            "{S}" | "season" => RuleField::Season,
            other => {
                return Err(RenameError::Parse(format!("unknown rule field: {other}")));
            }
        };
        let op = parse_op(symbol)?;
        Ok(Self { field, op, value })
    }

    /// Evaluate against a record; a missing field never matches.
    #[must_use]
    pub fn matches(&self, info: &MediaInfo) -> bool {
        let actual = match self.field {
            RuleField::Season => info.season,
            RuleField::Episode => info.episode,
        };
        actual.is_some_and(|v| self.op.compare(v, self.value))
    }
}

impl FromStr for SaveRule {
    type Err = RenameError;

    /// Legacy string form: `"episode>90"`, `"season<=2"`.
    fn from_str(s: &str) -> Result<Self> {
        // Two-character operators must be tried before their prefixes
        for symbol in [">=", "<=", ">", "<", "="] {
            if let Some((field, value)) = s.split_once(symbol) {
                let value = value
                    .trim()
                    .parse()
                    .map_err(|_| RenameError::Parse(format!("bad rule value in {s:?}")))?;
                return Self::from_parts(field.trim(), symbol, value);
            }
        }
        Err(RenameError::Parse(format!("unparseable rule: {s:?}")))
    }
}

/// Structured rule input as it arrives from the API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRuleSpec {
    #[serde(rename = "type")]
    pub rule_type: String,
    pub symbol: String,
    pub value: u32,
}

impl TryFrom<&SaveRuleSpec> for SaveRule {
    type Error = RenameError;

    fn try_from(spec: &SaveRuleSpec) -> Result<Self> {
        Self::from_parts(&spec.rule_type, &spec.symbol, spec.value)
    }
}

fn parse_op(symbol: &str) -> Result<RuleOp> {
    match symbol {
        ">" => Ok(RuleOp::Gt),
        ">=" => Ok(RuleOp::Ge),
        "<" => Ok(RuleOp::Lt),
        "<=" => Ok(RuleOp::Le),
        "=" => Ok(RuleOp::Eq),
        other => Err(RenameError::Parse(format!("unknown rule operator: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(season: Option<u32>, episode: Option<u32>) -> MediaInfo {
        MediaInfo {
            season,
            episode,
            ..Default::default()
        }
    }

    #[test]
    fn test_string_form_parses() {
        let rule: SaveRule = "episode>90".parse().unwrap();
        assert_eq!(rule.field, RuleField::Episode);
        assert_eq!(rule.op, RuleOp::Gt);
        assert_eq!(rule.value, 90);

        let rule: SaveRule = "season<=2".parse().unwrap();
        assert_eq!(rule.field, RuleField::Season);
        assert_eq!(rule.op, RuleOp::Le);
    }

    #[test]
    fn test_structured_form_parses() {
        let spec = SaveRuleSpec {
            rule_type: "{E}".to_string(),
            symbol: ">".to_string(),
            value: 90,
        };
        let rule = SaveRule::try_from(&spec).unwrap();
        assert_eq!(rule, "episode>90".parse().unwrap());
    }

    #[test]
    fn test_bad_input_rejected() {
        assert!("bitrate>90".parse::<SaveRule>().is_err());
        assert!("episode!90".parse::<SaveRule>().is_err());
        assert!("episode>abc".parse::<SaveRule>().is_err());
        assert!(SaveRule::from_parts("{E}", "!", 1).is_err());
    }

    #[test]
    fn test_evaluation() {
        let rule: SaveRule = "episode>90".parse().unwrap();
        assert!(rule.matches(&record(None, Some(91))));
        assert!(!rule.matches(&record(None, Some(90))));
        assert!(!rule.matches(&record(None, None)));

        let rule: SaveRule = "season=2".parse().unwrap();
        assert!(rule.matches(&record(Some(2), None)));
        assert!(!rule.matches(&record(Some(1), None)));
    }
}
