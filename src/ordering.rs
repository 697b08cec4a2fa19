//! Filename comparison matching the host file manager's sort order.
//!
//! The on-disk B-tree imposes a total order over `(filename, typeCode)`
//! pairs. The exact comparison the host application uses is undocumented;
//! the reference rule folds case and strips combining diacritics after NFD
//! decomposition, which is the POSIX-locale-with-folding behavior the
//! format's invariants describe.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Builds the folded comparison key for a filename: NFD-decompose, drop
/// combining marks, case-fold what remains.
fn folded_key(name: &str) -> Vec<char> {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Total order over filenames: primarily by folded key, with the original
/// string as a tiebreaker so that distinct filenames folding to the same
/// key still compare deterministically rather than as equal.
pub fn compare_filenames(a: &str, b: &str) -> std::cmp::Ordering {
    folded_key(a).cmp(&folded_key(b)).then_with(|| a.cmp(b))
}
