//! Per-run substitution report.

use crate::rules::RuleSet;
use serde::Serialize;

/// Substitutions made by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    /// Rule label.
    pub label: String,
    /// Text that was matched.
    pub from: String,
    /// Text it was replaced with.
    pub to: String,
    /// Number of substitutions.
    pub count: usize,
    /// 1-indexed line of each substitution, in file order.
    pub lines: Vec<usize>,
}

/// Per-rule and total substitution counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    rules: Vec<RuleCount>,
    total: usize,
}

impl RewriteReport {
    /// Empty report with one zeroed entry per rule, in rule order.
    #[must_use]
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            rules: rules
                .rules()
                .iter()
                .map(|rule| RuleCount {
                    label: rule.label().to_owned(),
                    from: rule.match_text().to_owned(),
                    to: rule.replacement().to_owned(),
                    count: 0,
                    lines: Vec::new(),
                })
                .collect(),
            total: 0,
        }
    }

    /// Records one substitution by the rule at `rule_index`.
    pub fn record(&mut self, rule_index: usize, line: usize) {
        if let Some(entry) = self.rules.get_mut(rule_index) {
            entry.count += 1;
            entry.lines.push(line);
            self.total += 1;
        }
    }

    /// Count for the rule with `label`, if such a rule exists.
    #[must_use]
    pub fn count(&self, label: &str) -> Option<usize> {
        self.rules.iter().find(|r| r.label == label).map(|r| r.count)
    }

    /// Every rule entry, in rule order.
    #[must_use]
    pub fn entries(&self) -> &[RuleCount] {
        &self.rules
    }

    /// Entries for rules that made at least one substitution.
    pub fn applied(&self) -> impl Iterator<Item = &RuleCount> {
        self.rules.iter().filter(|r| r.count > 0)
    }

    /// Total substitutions across all rules.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether nothing was substituted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSpec;

    #[test]
    fn test_record_and_totals() {
        let rules = RuleSet::new(&RuleSpec::default()).unwrap();
        let mut report = RewriteReport::new(&rules);
        assert!(report.is_noop());

        report.record(1, 4);
        report.record(1, 9);
        report.record(5, 2);

        assert_eq!(report.count("set"), Some(2));
        assert_eq!(report.count("getByPrefix"), Some(1));
        assert_eq!(report.count("get"), Some(0));
        assert_eq!(report.count("nope"), None);
        assert_eq!(report.total(), 3);

        let applied: Vec<&str> = report.applied().map(|r| r.label.as_str()).collect();
        assert_eq!(applied, vec!["set", "getByPrefix"]);
        assert_eq!(report.entries()[1].lines, vec![4, 9]);
    }

    #[test]
    fn test_record_ignores_unknown_rule() {
        let rules = RuleSet::new(&RuleSpec::default()).unwrap();
        let mut report = RewriteReport::new(&rules);
        report.record(42, 1);
        assert!(report.is_noop());
    }

    #[test]
    fn test_serializes_in_rule_order() {
        let rules = RuleSet::new(&RuleSpec::default()).unwrap();
        let mut report = RewriteReport::new(&rules);
        report.record(0, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["rules"][0]["label"], "get");
        assert_eq!(json["rules"][0]["from"], "await kv.get(");
        assert_eq!(json["rules"][5]["label"], "getByPrefix");
    }
}
