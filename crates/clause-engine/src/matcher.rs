//! Name matching between classifier clause names and free-text marker labels
//!
//! The classifier's `clause_name` and the label written into a marker drift
//! apart ("Argued On" vs "Argument Date", "Judge Signature" vs
//! "Judge Signature Required"). Matching is a strategy so lookups can be
//! tightened without touching the store or the patch engine.

/// How well two names agree. Ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    Exact,
    Prefix,
    Substring,
}

pub trait NameMatcher: Send + Sync {
    /// Compare a finding name against a marker label or region clause name
    fn score(&self, name: &str, label: &str) -> Option<MatchQuality>;

    fn matches(&self, name: &str, label: &str) -> bool {
        self.score(name, label).is_some()
    }
}

/// Case-insensitive equality only
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl NameMatcher for ExactMatcher {
    fn score(&self, name: &str, label: &str) -> Option<MatchQuality> {
        let (name, label) = (normalize(name), normalize(label));
        (!name.is_empty() && name == label).then_some(MatchQuality::Exact)
    }
}

/// Exact, then prefix, then substring in either direction
#[derive(Debug, Clone, Copy, Default)]
pub struct LooseMatcher;

impl NameMatcher for LooseMatcher {
    fn score(&self, name: &str, label: &str) -> Option<MatchQuality> {
        let (name, label) = (normalize(name), normalize(label));
        if name.is_empty() || label.is_empty() {
            return None;
        }

        if name == label {
            Some(MatchQuality::Exact)
        } else if name.starts_with(&label) || label.starts_with(&name) {
            Some(MatchQuality::Prefix)
        } else if name.contains(&label) || label.contains(&name) {
            Some(MatchQuality::Substring)
        } else {
            None
        }
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Best-scoring candidate for `label`; ties go to the earliest candidate
pub fn best_match<'a, T, I, F>(
    matcher: &dyn NameMatcher,
    label: &str,
    candidates: I,
    name_of: F,
) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> &str,
{
    let mut best: Option<(MatchQuality, &'a T)> = None;
    for candidate in candidates {
        if let Some(quality) = matcher.score(name_of(candidate), label) {
            match best {
                Some((current, _)) if current <= quality => {}
                _ => best = Some((quality, candidate)),
            }
            if quality == MatchQuality::Exact {
                break;
            }
        }
    }
    best.map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matcher_ignores_case_and_spacing() {
        assert!(ExactMatcher.matches("Case  Number", "case number"));
        assert!(!ExactMatcher.matches("Case Number", "Case Number Required"));
        assert!(!ExactMatcher.matches("", ""));
    }

    #[test]
    fn test_loose_matcher_grades_matches() {
        let m = LooseMatcher;
        assert_eq!(m.score("Judge Signature", "judge signature"), Some(MatchQuality::Exact));
        assert_eq!(
            m.score("Judge Signature", "Judge Signature Required"),
            Some(MatchQuality::Prefix)
        );
        assert_eq!(
            m.score("Judge Signature", "Second Judge Signature"),
            Some(MatchQuality::Substring)
        );
        assert_eq!(m.score("Force Majeure Clause", "Force"), Some(MatchQuality::Prefix));
        assert_eq!(m.score("Arbitration Clause", "Costs"), None);
        assert_eq!(m.score("Costs", ""), None);
    }

    #[test]
    fn test_best_match_prefers_quality_over_order() {
        let names = ["Second Judge Signature", "Judge Signature Required", "Judge Signature"];
        let found = best_match(&LooseMatcher, "Judge Signature", names.iter(), |s| *s);
        assert_eq!(found, Some(&"Judge Signature"));

        let found = best_match(&LooseMatcher, "Judge Signature", names[..2].iter(), |s| *s);
        assert_eq!(found, Some(&"Judge Signature Required"));
    }

    #[test]
    fn test_best_match_ties_go_to_first() {
        let names = ["Plaintiff Address", "Plaintiff Block"];
        let found = best_match(&LooseMatcher, "plaintiff", names.iter(), |s| *s);
        assert_eq!(found, Some(&"Plaintiff Address"));
    }
}
