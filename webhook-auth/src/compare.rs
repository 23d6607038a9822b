//! Constant-time byte comparison.

use subtle::ConstantTimeEq;

/// Compare two byte strings without leaking where they first differ.
///
/// A length mismatch returns `false` before the timing-sensitive path; only the lengths
/// are observable, never the contents.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Returns `true` if any candidate matches `expected` in constant time.
///
/// Every candidate is compared, even after a match, so the number of comparisons
/// does not depend on which candidate (if any) was valid.
pub fn any_constant_time_eq<'a, I>(expected: &[u8], candidates: I) -> bool
where
    I: IntoIterator<Item = &'a [u8]>,
{
    candidates
        .into_iter()
        .fold(false, |matched, candidate| {
            constant_time_eq(expected, candidate) | matched
        })
}
