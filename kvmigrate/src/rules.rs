//! Rewrite rules.
//!
//! A rule turns one literal call prefix (`await kv.get(`) into another
//! (`await kvWithRetry.get(`). Rules are built once from a [`RuleSpec`] and
//! never change afterwards; their order only affects how reports are printed.

use crate::constants::{
    CALL_DELIMITER, DEFAULT_METHODS, DEFAULT_PREFIX, DEFAULT_RECEIVER, DEFAULT_WRAPPER,
};
use crate::error::{MigrateError, Result};
use regex::Regex;
use std::collections::HashSet;

/// Inputs a rule set is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    /// Text required before the receiver (usually `await `).
    pub prefix: String,
    /// Receiver being replaced.
    pub receiver: String,
    /// Receiver it is replaced with.
    pub wrapper: String,
    /// Method names, one rule per method, in display order.
    pub methods: Vec<String>,
}

impl Default for RuleSpec {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            receiver: DEFAULT_RECEIVER.to_owned(),
            wrapper: DEFAULT_WRAPPER.to_owned(),
            methods: DEFAULT_METHODS.iter().map(|m| (*m).to_owned()).collect(),
        }
    }
}

/// A single (pattern, replacement, label) substitution.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    label: String,
    literal: String,
    replacement: String,
    pattern: Regex,
    /// Skip matches preceded by an identifier character.
    guarded: bool,
}

impl RewriteRule {
    /// Builds a rule matching `literal` exactly and replacing it with `replacement`.
    ///
    /// When the literal starts with an identifier character (letters, digits, `_`
    /// or `$`), a match directly after another identifier character is skipped,
    /// so `xawait kv.get(`, `mykv.get(` or `my$kv.get(` are left alone.
    pub fn literal(
        label: impl Into<String>,
        literal: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<Self> {
        let label = label.into();
        let literal = literal.into();
        let replacement = replacement.into();

        if literal.is_empty() {
            return Err(MigrateError::InvalidRule {
                label,
                reason: "empty match pattern".to_owned(),
            });
        }

        let guarded = literal.starts_with(is_identifier_char);
        let pattern =
            Regex::new(&regex::escape(&literal)).map_err(|e| MigrateError::InvalidRule {
                label: label.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            label,
            literal,
            replacement,
            pattern,
            guarded,
        })
    }

    /// Human label shown in reports.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The exact text being matched.
    #[must_use]
    pub fn match_text(&self) -> &str {
        &self.literal
    }

    /// The text each match is replaced with.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Byte ranges of every non-overlapping match in `text`.
    pub fn find_ranges<'t>(&'t self, text: &'t str) -> impl Iterator<Item = (usize, usize)> + 't {
        let mut from = 0;
        std::iter::from_fn(move || {
            while let Some(m) = self.pattern.find_at(text, from) {
                let inside_identifier = self.guarded
                    && text[..m.start()]
                        .chars()
                        .next_back()
                        .is_some_and(is_identifier_char);
                if inside_identifier {
                    // retry one character further on
                    from = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
                    continue;
                }
                from = m.end();
                return Some((m.start(), m.end()));
            }
            None
        })
    }
}

/// The immutable, ordered list of rules applied during a run.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    /// Generates one call-wrapping rule per method in `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::InvalidRule`] if `spec` has no methods, repeats a
    /// method, uses an empty or non-identifier receiver/wrapper/method, or if the
    /// generated rules would not be idempotent.
    pub fn new(spec: &RuleSpec) -> Result<Self> {
        check_identifier("receiver", &spec.receiver)?;
        check_identifier("wrapper", &spec.wrapper)?;
        if spec.receiver == spec.wrapper {
            return Err(MigrateError::InvalidRule {
                label: spec.wrapper.clone(),
                reason: "wrapper must differ from receiver".to_owned(),
            });
        }
        if spec.methods.is_empty() {
            return Err(MigrateError::InvalidRule {
                label: spec.receiver.clone(),
                reason: "no methods to rewrite".to_owned(),
            });
        }

        let mut rules = Vec::with_capacity(spec.methods.len());
        for method in &spec.methods {
            check_identifier("method", method)?;
            rules.push(RewriteRule::literal(
                method.as_str(),
                format!("{}{}.{method}{CALL_DELIMITER}", spec.prefix, spec.receiver),
                format!("{}{}.{method}{CALL_DELIMITER}", spec.prefix, spec.wrapper),
            )?);
        }

        Self::from_rules(rules)
    }

    /// Wraps arbitrary rules after checking labels are unique and the set is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::InvalidRule`] on a duplicate label or when a
    /// replacement could be matched again by a later run.
    pub fn from_rules(rules: Vec<RewriteRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.label.as_str()) {
                return Err(MigrateError::InvalidRule {
                    label: rule.label.clone(),
                    reason: "duplicate rule label".to_owned(),
                });
            }
        }

        for rule in &rules {
            for other in &rules {
                check_idempotent(rule, other)?;
            }
        }

        Ok(Self { rules })
    }

    /// Rules in display order.
    #[must_use]
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn check_identifier(what: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_' || first == '$')
                && chars.all(is_identifier_char)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(MigrateError::InvalidRule {
            label: name.to_owned(),
            reason: format!("{what} must be an identifier"),
        })
    }
}

/// Rejects `rule` if its pattern could match text produced by `other`'s replacement,
/// either inside the replacement or straddling one of its ends.
fn check_idempotent(rule: &RewriteRule, other: &RewriteRule) -> Result<()> {
    let produced = &other.replacement;
    let rejected = |reason: &str| MigrateError::InvalidRule {
        label: rule.label.clone(),
        reason: format!("{reason} '{}' of rule '{}'", produced, other.label),
    };

    if rule.find_ranges(produced).next().is_some() {
        return Err(rejected("pattern matches replacement"));
    }

    let literal = &rule.literal;
    for (i, _) in literal.char_indices().skip(1) {
        if produced.starts_with(&literal[i..]) {
            return Err(rejected("pattern can end inside replacement"));
        }
        if produced.ends_with(&literal[..i]) {
            return Err(rejected("pattern can start inside replacement"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::rewrite_text;

    fn spec_with(receiver: &str, wrapper: &str, methods: &[&str]) -> RuleSpec {
        RuleSpec {
            receiver: receiver.to_owned(),
            wrapper: wrapper.to_owned(),
            methods: methods.iter().map(|m| (*m).to_owned()).collect(),
            ..RuleSpec::default()
        }
    }

    #[test]
    fn test_default_rules_in_display_order() {
        let rules = RuleSet::new(&RuleSpec::default()).unwrap();
        let labels: Vec<&str> = rules.rules().iter().map(RewriteRule::label).collect();
        assert_eq!(
            labels,
            vec!["get", "set", "del", "mget", "mset", "getByPrefix"]
        );
        assert_eq!(rules.rules()[0].match_text(), "await kv.get(");
        assert_eq!(rules.rules()[0].replacement(), "await kvWithRetry.get(");
    }

    #[test]
    fn test_word_boundary_anchoring() {
        let rule = RewriteRule::literal("get", "kv.get(", "kvWithRetry.get(").unwrap();
        assert_eq!(rule.find_ranges("mykv.get(1)").count(), 0);
        assert_eq!(rule.find_ranges("(kv.get(1))").collect::<Vec<_>>(), vec![(1, 8)]);
    }

    #[test]
    fn test_delimiter_prevents_longer_method_match() {
        let rules = RuleSet::new(&RuleSpec::default()).unwrap();
        let get = &rules.rules()[0];
        assert_eq!(get.find_ranges("await kv.getAll(x)").count(), 0);
        assert_eq!(get.find_ranges("await kv.getByPrefix(x)").count(), 0);
        assert_eq!(get.find_ranges("await kvx.get(x)").count(), 0);
    }

    #[test]
    fn test_dollar_counts_as_identifier_character() {
        let spec = RuleSpec {
            prefix: String::new(),
            methods: vec!["get".to_owned()],
            ..RuleSpec::default()
        };
        let rules = RuleSet::new(&spec).unwrap();
        let (out, report) = rewrite_text(&rules, "$kv.get(a); obj.kv.get(b);").unwrap();
        assert_eq!(out, "$kv.get(a); obj.kvWithRetry.get(b);");
        assert_eq!(report.total(), 1);
    }

    #[test]
    fn test_dollar_receiver_inside_longer_identifier() {
        let spec = RuleSpec {
            prefix: String::new(),
            receiver: "$kv".to_owned(),
            ..RuleSpec::default()
        };
        let rules = RuleSet::new(&spec).unwrap();
        let (out, report) = rewrite_text(&rules, "my$kv.get(a);\n($kv.get(b));").unwrap();
        assert_eq!(out, "my$kv.get(a);\n(kvWithRetry.get(b));");
        assert_eq!(report.total(), 1);
    }

    #[test]
    fn test_skipped_match_does_not_hide_next_one() {
        let rule = RewriteRule::literal("get", "kv.get(", "kvWithRetry.get(").unwrap();
        let text = "xkv.get(1) kv.get(2) é_kv.get(3) ékv.get(4)";
        assert_eq!(rule.find_ranges(text).collect::<Vec<_>>(), vec![(11, 18)]);
    }

    #[test]
    fn test_non_word_literal_has_no_anchor() {
        let rule = RewriteRule::literal("paren", "(kv.", "(kvWithRetry.").unwrap();
        assert_eq!(rule.find_ranges("x(kv.get()").count(), 1);
    }

    #[test]
    fn test_rejects_duplicate_methods() {
        let err = RuleSet::new(&spec_with("kv", "kvWithRetry", &["get", "get"])).unwrap_err();
        assert!(err.to_string().contains("duplicate rule label"));
    }

    #[test]
    fn test_rejects_empty_methods() {
        let err = RuleSet::new(&spec_with("kv", "kvWithRetry", &[])).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidRule { .. }));
    }

    #[test]
    fn test_rejects_same_receiver_and_wrapper() {
        assert!(RuleSet::new(&spec_with("kv", "kv", &["get"])).is_err());
    }

    #[test]
    fn test_rejects_non_identifier_names() {
        assert!(RuleSet::new(&spec_with("kv", "kv Retry", &["get"])).is_err());
        assert!(RuleSet::new(&spec_with("", "kvWithRetry", &["get"])).is_err());
        assert!(RuleSet::new(&spec_with("kv", "kvWithRetry", &["get("])).is_err());
    }

    #[test]
    fn test_rejects_replacement_that_rematches() {
        let rule = RewriteRule::literal("get", "kv.get(", "retry(kv.get(").unwrap();
        let err = RuleSet::from_rules(vec![rule]).unwrap_err();
        assert!(err.to_string().contains("pattern matches replacement"));
    }

    #[test]
    fn test_rejects_replacement_that_straddles() {
        // "a.b" -> "xa." turns "a.bb" into "xa.b", which matches again
        let rule = RewriteRule::literal("wrap", "a.b", "xa.").unwrap();
        let err = RuleSet::from_rules(vec![rule]).unwrap_err();
        assert!(err.to_string().contains("pattern can start inside replacement"));
    }

    #[test]
    fn test_rule_order_does_not_change_result() {
        let forward = RuleSet::new(&RuleSpec::default()).unwrap();
        let mut reversed_rules = forward.rules().to_vec();
        reversed_rules.reverse();
        let reversed = RuleSet::from_rules(reversed_rules).unwrap();

        let text = "await kv.getByPrefix('a');\nawait kv.get(b);\nawait kv.mset([c]);\nawait kv.del(d);";
        let (out_fwd, report_fwd) = rewrite_text(&forward, text).unwrap();
        let (out_rev, report_rev) = rewrite_text(&reversed, text).unwrap();

        assert_eq!(out_fwd, out_rev);
        for label in ["get", "set", "del", "mget", "mset", "getByPrefix"] {
            assert_eq!(report_fwd.count(label), report_rev.count(label));
        }
        assert_eq!(report_fwd.total(), 4);
    }
}
