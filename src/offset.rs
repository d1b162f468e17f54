//! Offset helpers.
//!
//! The engines work in UTF-8 byte offsets. Host text widgets usually report
//! UTF-16 code units, so callers convert at the boundary.

/// Clamp `offset` into `text` and move it back onto a char boundary.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    let mut i = offset;
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Convert a UTF-16 code-unit offset to a byte offset.
///
/// Offsets past the end clamp to `text.len()`. An offset that falls between
/// the two halves of a surrogate pair resolves to the start of that char.
pub fn utf16_to_byte(text: &str, utf16: usize) -> usize {
    let mut units = 0usize;
    for (byte, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16 {
            return byte;
        }
        units = next;
    }
    text.len()
}

/// Convert a byte offset to a UTF-16 code-unit offset.
pub fn byte_to_utf16(text: &str, byte: usize) -> usize {
    let byte = floor_char_boundary(text, byte);
    text[..byte].chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_moves_inside_multibyte_back() {
        let s = "a£b";
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 3), 3);
        assert_eq!(floor_char_boundary(s, 99), s.len());
    }

    #[test]
    fn utf16_round_trip_with_astral_chars() {
        let s = "x😀y£z";
        // x=1 unit, 😀=2 units, y=1, £=1
        assert_eq!(utf16_to_byte(s, 0), 0);
        assert_eq!(utf16_to_byte(s, 1), 1);
        assert_eq!(utf16_to_byte(s, 2), 1);
        assert_eq!(utf16_to_byte(s, 3), 5);
        assert_eq!(utf16_to_byte(s, 4), 6);
        assert_eq!(utf16_to_byte(s, 5), 8);
        assert_eq!(utf16_to_byte(s, 100), s.len());

        for byte in [0, 1, 5, 6, 8, s.len()] {
            assert_eq!(utf16_to_byte(s, byte_to_utf16(s, byte)), byte);
        }
    }
}
