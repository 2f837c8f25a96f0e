//! Character codes for string constants.

/// Runtime character code for one character of a string constant.
///
/// Printable ASCII maps straight through, with two exceptions kept for
/// compatibility with the platform's character set: `/` maps to 92 and
/// a newline maps to 128. Backslash has no code at all.
pub fn char_code(c: char) -> Option<u16> {
    match c {
        '\n' => Some(128),
        '\\' => None,
        '/' => Some(92),
        ' '..='~' => Some(c as u16),
        _ => None,
    }
}
