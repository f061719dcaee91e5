//! Lexical similarity based on Ratcliff/Obershelp pattern matching
//!
//! The ratio is `2 * M / T`, where `T` is the combined length of both strings
//! and `M` the number of characters in matching blocks. Blocks are found by
//! taking the longest common substring and recursing on the unmatched text on
//! either side of it. Comparison is case-insensitive and counts Unicode scalar
//! values.
//!
//! Conventions: two empty strings are identical (`1.0`); one empty string
//! against a non-empty one scores `0.0`.

/// Case-insensitive similarity ratio in `[0, 1]`
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Whether `a` and `b` are similar enough to count as the same term
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) > threshold
}

/// Total size of all matching blocks between `a` and `b`
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block inside `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
/// Returns `(start_a, start_b, size)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    // run[j + 1] holds the length of the common suffix ending at a[i - 1], b[blo + j]
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in 0..width {
            current[j + 1] = if a[i] == b[blo + j] {
                previous[j] + 1
            } else {
                0
            };

            let size = current[j + 1];
            if size > best.2 {
                best = (i + 1 - size, blo + j + 1 - size, size);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_case_insensitive_identity() {
        assert!(approx(similarity("Python", "python"), 1.0));
        assert!(approx(similarity("DOCKER", "docker"), 1.0));
    }

    #[test]
    fn test_partial_overlap_is_strictly_between_bounds() {
        let score = similarity("Java", "JavaScript");
        assert!(score > 0.0 && score < 1.0);
        // 2 * 4 / 14
        assert!(approx(score, 8.0 / 14.0));
    }

    #[test]
    fn test_empty_string_conventions() {
        assert!(approx(similarity("", ""), 1.0));
        assert!(approx(similarity("", "rust"), 0.0));
        assert!(approx(similarity("rust", ""), 0.0));
    }

    #[test]
    fn test_disjoint_strings() {
        assert!(approx(similarity("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_recursive_blocks_are_counted() {
        // "abxcd" vs "abcd": blocks "ab" and "cd" -> 2 * 4 / 9
        assert!(approx(similarity("abxcd", "abcd"), 8.0 / 9.0));
    }

    #[test]
    fn test_known_ratio_values() {
        // "react" vs "reactjs": 2 * 5 / 12
        assert!(approx(similarity("React", "ReactJS"), 10.0 / 12.0));
        // "postgres" vs "postgresql": 2 * 8 / 18
        assert!(approx(similarity("Postgres", "PostgreSQL"), 16.0 / 18.0));
    }

    #[test]
    fn test_threshold_is_strict() {
        // "abc" vs "abd": 2 * 2 / 6 = 0.666...
        assert!(is_similar("abc", "abd", 0.6));
        // "ab" vs "ac": 2 * 1 / 4 = 0.5
        assert!(!is_similar("ab", "ac", 0.6));
        assert!(!is_similar("abc", "abc", 1.0));
    }

    #[test]
    fn test_non_ascii_counts_scalars() {
        assert!(approx(similarity("Café", "CAFÉ"), 1.0));
    }
}
