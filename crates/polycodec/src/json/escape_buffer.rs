//! Accumulates the four hexadecimal digits of a `\uXXXX` escape.
//!
//! The buffer keeps the digits exactly as written so that an escape which
//! turns out to be incomplete (a non hex character arrives early, or a lone
//! surrogate) can be copied to the output verbatim.
#[derive(Debug, Clone, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    buffer: [u8; 4],
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Digits fed since the last reset, as written.
    pub fn digits(&self) -> &str {
        // Only ASCII hex digits are ever stored.
        core::str::from_utf8(&self.buffer[..self.len as usize]).unwrap_or_default()
    }

    /// Feeds one character.
    ///
    /// - `None` if `c` is not a hex digit; the buffer is left untouched.
    /// - `Some(None)` while fewer than four digits have been seen.
    /// - `Some(Some(unit))` with the UTF-16 code unit once the fourth digit
    ///   arrives. The digits stay readable through [`digits`](Self::digits)
    ///   until the next reset.
    pub fn feed(&mut self, c: char) -> Option<Option<u16>> {
        if !c.is_ascii_hexdigit() || self.len >= 4 {
            return None;
        }
        self.buffer[self.len as usize] = c as u8;
        self.len += 1;

        if self.len < 4 {
            return Some(None);
        }
        let unit = self
            .buffer
            .iter()
            .fold(0u16, |acc, b| (acc << 4) | hex_value(*b));
        Some(Some(unit))
    }
}

fn hex_value(b: u8) -> u16 {
    match b {
        b'0'..=b'9' => u16::from(b - b'0'),
        b'a'..=b'f' => u16::from(b - b'a' + 10),
        b'A'..=b'F' => u16::from(b - b'A' + 10),
        _ => 0,
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Combines a surrogate pair into a scalar value.
pub(crate) fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_decoding() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed('0'), Some(None));
        assert_eq!(buf.feed('0'), Some(None));
        assert_eq!(buf.feed('4'), Some(None));
        assert_eq!(buf.feed('1'), Some(Some(0x41)));
        assert_eq!(buf.digits(), "0041");
    }

    #[test]
    fn mixed_case_hex() {
        let mut buf = UnicodeEscapeBuffer::new();
        let mut last = None;
        for ch in "AbCd".chars() {
            last = buf.feed(ch);
        }
        assert_eq!(last, Some(Some(0xABCD)));
    }

    #[test]
    fn reset_clears_buffer() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed('F'), Some(None));
        buf.reset();
        assert_eq!(buf.digits(), "");
        assert_eq!(buf.feed('0'), Some(None));
        assert_eq!(buf.digits(), "0");
    }

    #[test]
    fn non_hex_is_rejected_without_consuming() {
        let mut buf = UnicodeEscapeBuffer::new();
        buf.feed('1');
        assert_eq!(buf.feed('G'), None);
        assert_eq!(buf.digits(), "1");
    }

    #[test]
    fn surrogate_pair_combines() {
        assert!(is_high_surrogate(0xD83D));
        assert!(is_low_surrogate(0xDE00));
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), Some('\u{1F600}'));
    }
}
