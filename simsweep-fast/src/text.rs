//! Edit-distance text similarity.
//!
//! A surface-form counterpart to the vector cosine: two strings can be close
//! in embedding space yet read very differently, and vice versa. Used to show
//! both views side by side when comparing two records.

/// Levenshtein edit distance over Unicode scalar values.
///
/// Rolling two-row DP: O(len_a * len_b) time, O(len_b) space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let substitution = prev[j - 1] + usize::from(a_chars[i - 1] != b_chars[j - 1]);
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            curr[j] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized Levenshtein similarity in `[0, 1]`:
/// `1 - distance / max(len_a, len_b)`, with lengths in chars.
///
/// Two empty strings are identical and score `1.0`.
pub fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}
