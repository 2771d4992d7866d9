use serde::Serialize;

use super::models::DirectoryCandidate;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionResult {
    Matched {
        candidate: DirectoryCandidate,
        /// Distance of the winning candidate: 0 = identical, 1 = unrelated.
        distance: f64,
    },
    Unresolved,
}

impl ResolutionResult {
    pub fn into_candidate(self) -> Option<DirectoryCandidate> {
        match self {
            Self::Matched { candidate, .. } => Some(candidate),
            Self::Unresolved => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Single-best approximate name matcher.
///
/// Scores are distances in `[0, 1]` derived from Jaro-Winkler similarity over
/// case-folded names. A candidate's distance is the best of the whole name and
/// each of its words, so "Jon" sits close to "Jonathan Smith". A candidate is
/// accepted when its distance is at most `threshold`; ties keep the earliest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyResolver {
    threshold: f64,
}

impl FuzzyResolver {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn resolve(&self, query: &str, candidates: &[DirectoryCandidate]) -> ResolutionResult {
        let query = fold(query);
        if query.is_empty() {
            return ResolutionResult::Unresolved;
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let d = distance(&query, &fold(&candidate.name));
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((idx, d));
            }
        }

        match best {
            Some((idx, d)) if d <= self.threshold => {
                tracing::debug!(
                    target: "taskbridge.resolver",
                    query = %query,
                    matched = %candidates[idx].name,
                    distance = d,
                    "reference resolved"
                );
                ResolutionResult::Matched {
                    candidate: candidates[idx].clone(),
                    distance: d,
                }
            }
            other => {
                tracing::debug!(
                    target: "taskbridge.resolver",
                    query = %query,
                    candidates = candidates.len(),
                    best_distance = other.map(|(_, d)| d),
                    threshold = self.threshold,
                    "reference unresolved"
                );
                ResolutionResult::Unresolved
            }
        }
    }
}

/// Distance between an already folded query and candidate name.
pub fn distance(query: &str, name: &str) -> f64 {
    if name.is_empty() {
        return 1.0;
    }
    let whole = 1.0 - strsim::jaro_winkler(query, name);
    name.split(' ')
        .map(|word| 1.0 - strsim::jaro_winkler(query, word))
        .fold(whole, f64::min)
        .clamp(0.0, 1.0)
}

fn fold(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<DirectoryCandidate> {
        vec![
            DirectoryCandidate::new("Jonathan Smith", "u1"),
            DirectoryCandidate::new("Maria Garcia", "u2"),
            DirectoryCandidate::new("Bob Lee", "u3"),
        ]
    }

    #[test]
    fn empty_candidate_set_is_unresolved() {
        assert_eq!(
            FuzzyResolver::new(1.0).resolve("Jon", &[]),
            ResolutionResult::Unresolved
        );
    }

    #[test]
    fn exact_name_matches_at_any_threshold() {
        for threshold in [0.0, 0.05, 0.4, 1.0] {
            let result = FuzzyResolver::new(threshold).resolve("Maria Garcia", &people());
            assert_eq!(
                result.into_candidate(),
                Some(DirectoryCandidate::new("Maria Garcia", "u2"))
            );
        }
    }

    #[test]
    fn matching_ignores_case_and_spacing() {
        let result = FuzzyResolver::new(0.0).resolve("  maria   GARCIA ", &people());
        assert_eq!(result.into_candidate().map(|c| c.id), Some("u2".to_string()));
    }

    #[test]
    fn first_name_prefix_matches_under_default_threshold() {
        let result = FuzzyResolver::new(0.4).resolve("Jon", &people());
        match result {
            ResolutionResult::Matched {
                candidate,
                distance,
            } => {
                assert_eq!(candidate.id, "u1");
                assert!(distance > 0.05 && distance < 0.4, "distance={distance}");
            }
            ResolutionResult::Unresolved => panic!("expected a match"),
        }
    }

    #[test]
    fn tight_threshold_rejects_partial_match() {
        assert_eq!(
            FuzzyResolver::new(0.05).resolve("Jon", &people()),
            ResolutionResult::Unresolved
        );
    }

    #[test]
    fn unrelated_query_is_unresolved() {
        assert_eq!(
            FuzzyResolver::new(0.4).resolve("Quincy", &people()),
            ResolutionResult::Unresolved
        );
    }

    #[test]
    fn blank_query_is_unresolved() {
        assert_eq!(
            FuzzyResolver::new(1.0).resolve("   ", &people()),
            ResolutionResult::Unresolved
        );
    }

    #[test]
    fn ties_keep_first_candidate() {
        let dupes = vec![
            DirectoryCandidate::new("Sam Carter", "first"),
            DirectoryCandidate::new("Sam Carter", "second"),
        ];
        let result = FuzzyResolver::new(0.4).resolve("Sam Carter", &dupes);
        assert_eq!(result.into_candidate().map(|c| c.id), Some("first".into()));
    }

    #[test]
    fn resolution_is_deterministic() {
        let resolver = FuzzyResolver::new(0.4);
        let first = resolver.resolve("Mari", &people());
        for _ in 0..10 {
            assert_eq!(resolver.resolve("Mari", &people()), first);
        }
    }
}
