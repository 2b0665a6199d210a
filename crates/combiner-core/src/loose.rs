//! Loose comparison and collision-safe name generation (Glossary: "Loose
//! comparison", "NextCandidateName").

use serde_json::Value;
use std::collections::HashSet;

/// Loose equality: case-insensitive strings, empty containers of the same
/// container-type are equal, objects compare by key set + recursive value
/// equality, lists compare as a multiset under loose equivalence.
///
/// Strict comparison (used for the byte-identical round-trip property) is
/// just `==` on the underlying [`serde_json::Value`].
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.to_lowercase() == y.to_lowercase(),
        (Value::Array(x), Value::Array(y)) => multiset_loose_eq(x, y),
        (Value::Object(x), Value::Object(y)) => {
            let xk: HashSet<&String> = x.keys().collect();
            let yk: HashSet<&String> = y.keys().collect();
            if xk != yk {
                return false;
            }
            x.keys().all(|k| loose_eq(&x[k], &y[k]))
        }
        _ => a == b,
    }
}

fn multiset_loose_eq(x: &[Value], y: &[Value]) -> bool {
    if x.len() != y.len() {
        return false;
    }
    let mut used = vec![false; y.len()];
    'outer: for xv in x {
        for (j, yv) in y.iter().enumerate() {
            if !used[j] && loose_eq(xv, yv) {
                used[j] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

const SEPARATORS: [char; 3] = ['-', '_', '.'];

/// Find the last numeric suffix of `s` (considering separators `-`, `_`,
/// `.`, or no separator at all) and increment it; if `s` has no trailing
/// digits, append `"-1"`.
pub fn next_candidate_name(s: &str) -> String {
    let char_count = s.chars().count();
    let digit_count = s.chars().rev().take_while(char::is_ascii_digit).count();

    if digit_count == 0 {
        return format!("{s}-1");
    }

    let split_at = char_count - digit_count;
    let digits: String = s.chars().skip(split_at).collect();
    let before: String = s.chars().take(split_at).collect();

    let (stem, sep) = match before.chars().last() {
        Some(c) if SEPARATORS.contains(&c) => {
            let stem: String = before.chars().take(before.chars().count() - 1).collect();
            (stem, c.to_string())
        }
        _ => (before, String::new()),
    };

    let num: u64 = digits.parse().unwrap_or(0);
    let next = num + 1;
    let next_digits = if digits.starts_with('0') {
        format!("{:0width$}", next, width = digits.len())
    } else {
        next.to_string()
    };

    format!("{stem}{sep}{next_digits}")
}

/// Apply [`next_candidate_name`] to `base` until `taken` no longer reports a
/// collision. Terminates in at most `|S|+1` applications for a finite
/// collision set `S` because the numeric suffix is strictly increasing.
pub fn next_free_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut candidate = next_candidate_name(base);
    while taken(&candidate) {
        candidate = next_candidate_name(&candidate);
    }
    candidate
}
