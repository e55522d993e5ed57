//! Locale-aware string comparison for alphabetical story sorting.
//!
//! Strings are compared the way a Unicode collator with accent sensitivity
//! and numeric ordering does:
//! 1. Primary level: base letters (case-folded, diacritics removed), digit
//!    runs compared by numeric value.
//! 2. Secondary level: diacritics. An unaccented letter sorts before the same
//!    letter with an accent.
//!
//! Case never participates, so `"a"` and `"A"` compare equal.

use std::cmp::Ordering;
use std::sync::Once;

use smallvec::SmallVec;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::types::Locales;

static LOCALES_NOTICE: Once = Once::new();

#[derive(Debug, PartialEq, Eq)]
enum Primary {
    // Leading zeros stripped
    Number(String),
    Char(char),
}

#[derive(Debug)]
struct Element {
    primary: Primary,
    accents: SmallVec<[char; 2]>,
}

/// Primary weight class: punctuation and symbols, then digits, then letters.
fn class_of(c: char) -> u8 {
    if c.is_numeric() {
        1
    } else if c.is_alphabetic() {
        2
    } else {
        0
    }
}

fn compare_primary(a: &Primary, b: &Primary) -> Ordering {
    match (a, b) {
        (Primary::Number(x), Primary::Number(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Primary::Number(_), Primary::Char(c)) => 1.cmp(&class_of(*c)).then(Ordering::Less),
        (Primary::Char(c), Primary::Number(_)) => class_of(*c).cmp(&1).then(Ordering::Greater),
        (Primary::Char(x), Primary::Char(y)) => {
            class_of(*x).cmp(&class_of(*y)).then_with(|| x.cmp(y))
        }
    }
}

fn elements(s: &str) -> Vec<Element> {
    let mut out: Vec<Element> = Vec::with_capacity(s.len());
    let mut digits = String::new();

    let flush_digits = |digits: &mut String, out: &mut Vec<Element>| {
        if digits.is_empty() {
            return;
        }
        let trimmed = digits.trim_start_matches('0');
        let value = if trimmed.is_empty() { "0" } else { trimmed };
        out.push(Element {
            primary: Primary::Number(value.to_string()),
            accents: SmallVec::new(),
        });
        digits.clear();
    };

    for c in s.nfd() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        flush_digits(&mut digits, &mut out);

        if is_combining_mark(c) {
            if let Some(last) = out.last_mut() {
                last.accents.push(c);
            }
            continue;
        }

        for lower in c.to_lowercase() {
            out.push(Element {
                primary: Primary::Char(lower),
                accents: SmallVec::new(),
            });
        }
    }
    flush_digits(&mut digits, &mut out);
    out
}

/// Compare two strings for alphabetical story ordering.
///
/// `locales` is accepted for configuration compatibility; the comparison uses
/// the root collation order, which already orders scripts such as Cyrillic by
/// their alphabet.
pub fn collate(a: &str, b: &str, locales: Option<&Locales>) -> Ordering {
    if let Some(locales) = locales.filter(|l| !l.as_slice().is_empty()) {
        LOCALES_NOTICE.call_once(|| {
            debug!(locales = ?locales.as_slice(), "Sort locales configured; using root collation");
        });
    }
    if a == b {
        return Ordering::Equal;
    }
    let left = elements(a);
    let right = elements(b);

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = compare_primary(&x.primary, &y.primary);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    let by_len = left.len().cmp(&right.len());
    if by_len != Ordering::Equal {
        return by_len;
    }

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = x.accents.as_slice().cmp(y.accents.as_slice());
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
