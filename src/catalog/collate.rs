//! Natural ordering of file names.
//!
//! Pages are presented in the order a person would sort file names:
//! case-insensitively, with runs of digits compared by numeric value so that
//! `page2` comes before `page10`, and with `.` sorting before any other
//! character so that `page.jpg` comes before `page-a.jpg`.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compares two file names in natural order.
///
/// Names that compare equal ignoring case and leading zeros are ordered by
/// their number of leading zeros, then by their raw bytes, so the result is
/// a total order.
///
/// # Example
///
/// ```rust
/// use cbarchive::catalog::compare_filenames;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_filenames("page2.jpg", "page10.jpg"), Ordering::Less);
/// assert_eq!(compare_filenames("Cover.png", "back.png"), Ordering::Greater);
/// ```
pub fn compare_filenames(a: &str, b: &str) -> Ordering {
    let mut zeros_tiebreak = Ordering::Equal;
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        let (l, r) = match (left.peek().copied(), right.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => (l, r),
        };

        if l.is_ascii_digit() && r.is_ascii_digit() {
            let (l_digits, l_zeros) = take_number(&mut left);
            let (r_digits, r_zeros) = take_number(&mut right);

            let by_value = l_digits
                .len()
                .cmp(&r_digits.len())
                .then_with(|| l_digits.cmp(&r_digits));
            if by_value != Ordering::Equal {
                return by_value;
            }
            if zeros_tiebreak == Ordering::Equal {
                zeros_tiebreak = l_zeros.cmp(&r_zeros);
            }
            continue;
        }

        let by_char = char_key(l).cmp(&char_key(r));
        if by_char != Ordering::Equal {
            return by_char;
        }
        left.next();
        right.next();
    }

    zeros_tiebreak.then_with(|| a.cmp(b))
}

/// Sort key of a single non-digit character.
fn char_key(c: char) -> (u8, char) {
    if c == '.' {
        (0, c)
    } else {
        (1, c.to_lowercase().next().unwrap_or(c))
    }
}

/// Consumes a digit run, returning its significant digits and the count of
/// leading zeros stripped from it.
fn take_number(chars: &mut Peekable<Chars<'_>>) -> (String, usize) {
    let mut digits = String::new();
    let mut zeros = 0;

    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        if c == '0' && digits.is_empty() {
            zeros += 1;
        } else {
            digits.push(c);
        }
        chars.next();
    }

    (digits, zeros)
}
