use crate::errors::{Error, Result};
use crate::patterns::BUILTIN_RULES;
use regex::{Regex, RegexBuilder};
use regex_automata::{Anchored, Input, meta};
use std::borrow::Cow;

/// A single pattern-to-replacement rule.
///
/// The pattern is compiled twice: once case-insensitively, which is what the
/// rule matches with, and once in its written case, which decides precedence
/// between rules that are case variants of each other.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    replacement: String,
    matcher: Regex,
    exact: meta::Regex,
}

impl Rule {
    /// Compiles a new rule. The replacement is inserted verbatim; `$` is not
    /// expanded as a capture group reference.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();

        let matcher = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidRule {
                pattern: pattern.clone(),
                source: Box::new(e),
            })?;
        let exact = meta::Regex::new(&pattern).map_err(|e| Error::InvalidRule {
            pattern: pattern.clone(),
            source: Box::new(e),
        })?;

        Ok(Self {
            pattern,
            replacement: replacement.into(),
            matcher,
            exact,
        })
    }

    /// The pattern source as written.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The literal replacement text.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Runs the case-sensitive pattern anchored at `start`, returning the match end.
    ///
    /// The search never looks for a match further along the haystack, while the
    /// text before `start` still counts for `\b` and other look-around.
    fn exact_match_end_at(&self, haystack: &str, start: usize) -> Option<usize> {
        let input = Input::new(haystack)
            .span(start..haystack.len())
            .anchored(Anchored::Yes);
        self.exact.search(&input).map(|m| m.end())
    }

    /// Returns `true` if the case-sensitive pattern matches starting exactly at `start`.
    fn exact_match_starts_at(&self, haystack: &str, start: usize) -> bool {
        self.exact_match_end_at(haystack, start).is_some()
    }

    /// Returns `true` if the case-sensitive pattern matches exactly `[start, end)`.
    fn exact_match_spans(&self, haystack: &str, start: usize, end: usize) -> bool {
        self.exact_match_end_at(haystack, start) == Some(end)
    }

    /// Replaces every non-deferred match in `haystack`.
    ///
    /// A match that only exists case-insensitively is left in place when one of
    /// the `later` rules matches at the same position in its exact case.
    /// Returns `None` when nothing was replaced.
    fn replace_in(&self, haystack: &str, later: &[Rule]) -> (Option<String>, usize) {
        let mut output = String::new();
        let mut last = 0;
        let mut count = 0;

        for m in self.matcher.find_iter(haystack) {
            let deferred = !self.exact_match_spans(haystack, m.start(), m.end())
                && later
                    .iter()
                    .any(|rule| rule.exact_match_starts_at(haystack, m.start()));
            if deferred {
                continue;
            }

            output.push_str(&haystack[last..m.start()]);
            output.push_str(&self.replacement);
            last = m.end();
            count += 1;
        }

        if count == 0 {
            return (None, 0);
        }

        output.push_str(&haystack[last..]);
        (Some(output), count)
    }
}

/// The result of running a `RuleTable` over a buffer.
#[derive(Debug)]
pub struct Substitution<'a> {
    /// The rewritten content. Borrowed from the input when no rule matched.
    pub content: Cow<'a, str>,
    /// Replacement counts, one per rule in table order.
    pub per_rule: Vec<usize>,
    /// Sum of `per_rule`.
    pub total: usize,
}

/// An ordered, immutable collection of rules.
///
/// Rules are applied sequentially: each one sees the buffer as rewritten by
/// every rule before it. Swapping two rules can change the output.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Builds a table from `(pattern, replacement)` pairs, keeping their order.
    pub fn from_pairs<P, R>(pairs: &[(P, R)]) -> Result<Self>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let rules = pairs
            .iter()
            .map(|(pattern, replacement)| Rule::new(pattern.as_ref(), replacement.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// The built-in customer reference table.
    pub fn builtin() -> Result<Self> {
        Self::from_pairs(BUILTIN_RULES)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule in order and returns the new content with the total
    /// number of replacements.
    pub fn apply(&self, content: &str) -> (String, usize) {
        let result = self.substitute(content);
        (result.content.into_owned(), result.total)
    }

    /// Applies every rule in order, keeping a count for each rule.
    pub fn substitute<'a>(&self, content: &'a str) -> Substitution<'a> {
        let mut buffer = Cow::Borrowed(content);
        let mut per_rule = Vec::with_capacity(self.rules.len());

        for (index, rule) in self.rules.iter().enumerate() {
            let (rewritten, count) = rule.replace_in(buffer.as_ref(), &self.rules[index + 1..]);
            if let Some(rewritten) = rewritten {
                buffer = Cow::Owned(rewritten);
            }
            per_rule.push(count);
        }

        let total = per_rule.iter().sum();
        Substitution {
            content: buffer,
            per_rule,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_no_match_returns_input_untouched() {
        let table = RuleTable::builtin().unwrap();
        let content = "nothing sensitive in here\nsecond line\n";

        let result = table.substitute(content);
        assert!(matches!(result.content, Cow::Borrowed(_)));
        assert_eq!(table.apply(content), (content.to_string(), 0));
    }

    #[test]
    fn test_customer_a_scenario() {
        let table = RuleTable::builtin().unwrap();
        let (output, count) = table.apply("Estee Lauder uses ELC-prod and elc-storage");
        assert_eq!(output, "Customer-A uses CUST-A-prod and cust-a-storage");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_managed_service_provider_scenario() {
        let table = RuleTable::builtin().unwrap();
        let (output, count) = table.apply("10th Magnitude (10M) manages 10m workloads");
        assert_eq!(output, "ManagedServiceProvider (MSP) manages msp workloads");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_case_insensitive_match_with_verbatim_replacement() {
        let table = RuleTable::from_pairs(&[(r"\bacme\b", "Customer-X")]).unwrap();
        let (output, count) = table.apply("ACME, Acme and aCmE");
        assert_eq!(output, "Customer-X, Customer-X and Customer-X");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_rule_order_changes_output() {
        // The first rule's replacement contains text the second rule matches.
        let forward = RuleTable::from_pairs(&[("alpha", "beta-x"), ("beta", "gamma")]).unwrap();
        let reverse = RuleTable::from_pairs(&[("beta", "gamma"), ("alpha", "beta-x")]).unwrap();

        assert_eq!(forward.apply("alpha"), ("gamma-x".to_string(), 2));
        assert_eq!(reverse.apply("alpha"), ("beta-x".to_string(), 1));
    }

    #[test]
    fn test_second_application_finds_nothing_new() {
        let table = RuleTable::builtin().unwrap();
        let input = "Helmerich & Payne (H&P) and Children's Mercy run hp-api, cmh-web, pgo-db";

        let (first, first_count) = table.apply(input);
        let (second, second_count) = table.apply(&first);

        assert!(first_count > 0);
        assert_eq!(second_count, 0);
        assert_eq!(first, second);
        assert_eq!(first, "Customer-B (CUST-B) and Customer-C run cust-b-api, cust-c-web, app-db");
    }

    #[test]
    fn test_non_converging_table_counts_do_not_grow() {
        let table = RuleTable::from_pairs(&[("ab", "aab")]).unwrap();
        let (first, first_count) = table.apply("ab ab");
        let (_, second_count) = table.apply(&first);
        assert_eq!(first_count, 2);
        assert!(second_count <= first_count);
    }

    #[test]
    fn test_matches_are_non_overlapping_left_to_right() {
        let table = RuleTable::from_pairs(&[("aa", "b")]).unwrap();
        assert_eq!(table.apply("aaaaa"), ("bba".to_string(), 2));
    }

    #[test]
    fn test_replacement_is_literal() {
        let table = RuleTable::from_pairs(&[("(secret)", "$1-$0")]).unwrap();
        assert_eq!(table.apply("a secret"), ("a $1-$0".to_string(), 1));
    }

    #[test]
    fn test_per_rule_counts() {
        let table = RuleTable::builtin().unwrap();
        let result = table.substitute("CMH and cmh-app and CMH");
        let counts: Vec<(&str, usize)> = table
            .rules()
            .iter()
            .zip(&result.per_rule)
            .filter(|(_, count)| **count > 0)
            .map(|(rule, count)| (rule.pattern(), *count))
            .collect();

        assert_eq!(counts, vec![(r"\bCMH\b", 2), (r"\bcmh-", 1)]);
        assert_eq!(result.total, 3);
        assert_eq!(result.content, "CUST-C and cust-c-app and CUST-C");
    }

    #[test]
    fn test_earlier_rule_without_exact_competitor_keeps_match() {
        // No later rule matches "ELC" or "Elc" in its written case.
        let table = RuleTable::builtin().unwrap();
        assert_eq!(table.apply("ELC-prod"), ("CUST-A-prod".to_string(), 1));
        assert_eq!(table.apply("Elc-prod"), ("CUST-A-prod".to_string(), 1));
    }

    #[test]
    fn test_mixed_case_input_scales_linearly() {
        // Every "Elc" only matches case-insensitively, so each one triggers the
        // exact-case check against all later rules.
        let table = RuleTable::builtin().unwrap();
        let input = "Elc ".repeat(100_000);

        let started = Instant::now();
        let (output, count) = table.apply(&input);
        let elapsed = started.elapsed();

        assert_eq!(count, 100_000);
        assert_eq!(output, "CUST-A ".repeat(100_000));
        assert!(elapsed < Duration::from_secs(30), "took {elapsed:?}");
    }

    #[test]
    fn test_exact_case_check_keeps_word_boundary_context() {
        // "xelc-" has no word boundary before "elc", so the lowercase rule never
        // claims it and the uppercase rule must not defer to it.
        let table = RuleTable::from_pairs(&[(r"ELC", "CUST-A"), (r"\belc-", "cust-a-")]).unwrap();
        assert_eq!(table.apply("xelc-1"), ("xCUST-A-1".to_string(), 1));
        assert_eq!(table.apply("x elc-1"), ("x cust-a-1".to_string(), 1));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = Rule::new("(unclosed", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidRule { ref pattern, .. } if pattern == "(unclosed"));
    }
}
