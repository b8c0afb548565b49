//! Sibling ordering: directories first, then names in locale-aware order.
//!
//! Names are compared in three passes, approximating the default root-locale
//! collation used by desktop file browsers:
//!
//! 1. base letters, case and diacritics ignored (punctuation and symbols < digits < letters),
//! 2. diacritics,
//! 3. case, lowercase before uppercase.
//!
//! Remaining ties fall back to raw code-point order so the ordering is total.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Order two sibling entries: directories before files, then by name.
pub fn compare_entries(a_is_dir: bool, a_name: &str, b_is_dir: bool, b_name: &str) -> Ordering {
    b_is_dir
        .cmp(&a_is_dir)
        .then_with(|| locale_compare(a_name, b_name))
}

/// Locale-aware string comparison.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| tertiary_key(a).cmp(&tertiary_key(b)))
        .then_with(|| a.cmp(b))
}

fn char_class(c: char) -> u8 {
    if c.is_numeric() {
        1
    } else if c.is_alphabetic() {
        2
    } else {
        0
    }
}

fn primary_key(s: &str) -> Vec<(u8, char)> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
        .collect()
}

fn secondary_key(s: &str) -> Vec<char> {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn case_rank(c: char) -> u8 {
    if c.is_lowercase() {
        0
    } else if c.is_uppercase() {
        1
    } else {
        2
    }
}

fn tertiary_key(s: &str) -> Vec<u8> {
    s.nfd().map(case_rank).collect()
}
