//! Fuzzy skill-name matching.
//!
//! Similarity is the Gestalt (Ratcliff/Obershelp) ratio `2 * M / T`, where `M` counts the
//! characters in recursively found longest common blocks and `T` is the total length of both
//! strings. Comparison is case-insensitive.

/// Similarity ratio in `[0, 1]`; 1.0 for identical strings (ignoring case).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let left: Vec<char> = a.to_lowercase().chars().collect();
    let right: Vec<char> = b.to_lowercase().chars().collect();
    let total = left.len() + right.len();
    if total == 0 {
        return 1.0;
    }
    let matches = matching_chars(&left, &right);
    2.0 * matches as f64 / total as f64
}

/// Correct `name` to the closest vocabulary entry.
///
/// An exact case-insensitive hit is returned in its vocabulary spelling regardless of the
/// threshold. Otherwise the best entry with a ratio `>= threshold` wins; ties keep the
/// earlier entry. Without a good enough entry the input is returned unchanged.
#[must_use]
pub fn correct<'a, I>(name: &str, vocabulary: I, threshold: f64) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let trimmed = name.trim();
    let folded = trimmed.to_lowercase();
    let mut best: Option<(&str, f64)> = None;
    for entry in vocabulary {
        if entry.to_lowercase() == folded {
            return entry.to_string();
        }
        let ratio = similarity_ratio(trimmed, entry);
        if best.is_none_or(|(_, top)| ratio > top) {
            best = Some((entry, ratio));
        }
    }

    match best {
        Some((entry, ratio)) if ratio >= threshold => entry.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Best similarity between `needle` and any of `candidates`.
#[must_use]
pub fn best_ratio<'a, I>(needle: &str, candidates: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| similarity_ratio(needle, candidate))
        .fold(0.0, f64::max)
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..start_a], &b[..start_b])
        + matching_chars(&a[start_a + len..], &b[start_b + len..])
}

/// Longest common contiguous block as `(start_a, start_b, len)`, earliest in `a` on ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0_usize; b.len() + 1];
    for (i, ch_a) in a.iter().enumerate() {
        let mut curr = vec![0_usize; b.len() + 1];
        for (j, ch_b) in b.iter().enumerate() {
            if ch_a == ch_b {
                let run = prev[j] + 1;
                curr[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        prev = curr;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCAB: [&str; 5] = ["Python", "JavaScript", "AWS", "Docker", "Machine Learning"];

    #[test]
    fn test_identical_is_one() {
        assert!((similarity_ratio("Rust", "rust") - 1.0).abs() < f64::EPSILON);
        assert!((similarity_ratio("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transposition_ratio() {
        let ratio = similarity_ratio("pyhton", "python");
        assert!((ratio - 10.0 / 12.0).abs() < 1e-9, "ratio = {ratio}");
    }

    #[test]
    fn test_ratio_is_symmetric_on_samples() {
        for (a, b) in [("docker", "dokcer"), ("aws", "azure"), ("java", "javascript")] {
            assert!((similarity_ratio(a, b) - similarity_ratio(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_exact_match_ignores_threshold() {
        assert_eq!(correct("python", VOCAB, 1.0), "Python");
        assert_eq!(correct("AWS", VOCAB, 0.99), "AWS");
    }

    #[test]
    fn test_typo_is_corrected() {
        assert_eq!(correct("pyhton", VOCAB, 0.6), "Python");
        assert_eq!(correct("dokcer", VOCAB, 0.6), "Docker");
    }

    #[test]
    fn test_novel_skill_is_kept() {
        assert_eq!(correct("Elixir", VOCAB, 0.6), "Elixir");
        assert_eq!(correct("anything", std::iter::empty(), 0.6), "anything");
    }

    #[test]
    fn test_best_ratio() {
        assert!(best_ratio("javascrpt", ["java", "javascript"]) > 0.9);
        assert!(best_ratio("x", std::iter::empty()).abs() < f64::EPSILON);
    }
}
