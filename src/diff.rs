//! Symmetric set-difference over string slices.

/// Returns the values present in exactly one of `a` and `b`.
///
/// Order is deterministic: unmatched elements of `a` first, then unmatched
/// elements of `b`. The merge phase uses this to find destination branches a
/// source repository did not directly contribute to.
pub fn strings(a: &[String], b: &[String]) -> Vec<String> {
    let mut diff = Vec::new();

    for (xs, ys) in [(a, b), (b, a)] {
        for x in xs {
            if !ys.contains(x) {
                diff.push(x.clone());
            }
        }
    }

    diff
}
