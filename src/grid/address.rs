//! A1-style cell addressing.
//
// Rows and columns are 1-based everywhere in this crate, matching the
// coordinates a timetable author sees in their spreadsheet application.

/// Convert a 1-based column index to its letters (1 -> "A", 28 -> "AB").
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a 1-based index. Case-insensitive.
pub fn column_index(letters: &str) -> Option<u32> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        if c.is_ascii_alphabetic() {
            Some(acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
        } else {
            None
        }
    })
}

/// Format a `(row, col)` pair as an A1 coordinate.
pub fn coordinate(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row)
}

/// Parse an A1 coordinate into `(row, col)`.
pub fn parse_coordinate(coord: &str) -> Option<(u32, u32)> {
    let coord = coord.trim();
    let split = coord.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = coord.split_at(split);
    let col = column_index(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, "A")]
    #[test_case(4, "D")]
    #[test_case(26, "Z")]
    #[test_case(27, "AA")]
    #[test_case(28, "AB")]
    #[test_case(702, "ZZ")]
    #[test_case(703, "AAA")]
    fn test_column_letters(col: u32, expected: &str) {
        assert_eq!(column_letters(col), expected);
        assert_eq!(column_index(expected), Some(col));
    }

    #[test]
    fn test_column_index_rejects_garbage() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
        assert_eq!(column_index("ABCD"), None);
        assert_eq!(column_index("b"), Some(2));
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("D5"), Some((5, 4)));
        assert_eq!(parse_coordinate("AB12"), Some((12, 28)));
        assert_eq!(parse_coordinate("A0"), None);
        assert_eq!(parse_coordinate("12"), None);
        assert_eq!(parse_coordinate("B"), None);
        assert_eq!(coordinate(12, 28), "AB12");
    }
}
