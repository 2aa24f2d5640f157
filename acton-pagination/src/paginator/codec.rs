//! Opaque cursor tokens
//!
//! A token is the form-urlencoded triple `o=<offset>&r=1&p=<position>`
//! (defaults omitted) in URL-safe base64 without padding.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use url::form_urlencoded;

/// Emits unpadded tokens, accepts padded and unpadded input
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Where a cursor page resumes
///
/// `position` is the rendered ordering-key value to resume after, `offset`
/// the number of rows sharing that position to skip, and `reverse` whether
/// the page is read backwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub offset: u64,
    pub reverse: bool,
    pub position: Option<String>,
}

impl Cursor {
    pub fn new(offset: u64, reverse: bool, position: Option<String>) -> Self {
        Self {
            offset,
            reverse,
            position,
        }
    }
}

/// Encodes and decodes cursor tokens
///
/// # Example
///
/// ```rust
/// use acton_pagination::paginator::{Cursor, CursorCodec};
///
/// let codec = CursorCodec::new(1000, 4096);
/// let cursor = Cursor::new(2, true, Some("2024-01-01T00:00:00+00:00".to_string()));
///
/// let token = codec.encode(&cursor);
/// assert!(!token.contains('='));
/// assert_eq!(codec.decode(&token), Some(cursor));
/// assert_eq!(codec.decode("%%%"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorCodec {
    offset_cutoff: u64,
    max_token_len: usize,
}

impl CursorCodec {
    #[must_use]
    pub const fn new(offset_cutoff: u64, max_token_len: usize) -> Self {
        Self {
            offset_cutoff,
            max_token_len,
        }
    }

    /// Largest offset a decoded cursor may carry
    #[must_use]
    pub const fn offset_cutoff(&self) -> u64 {
        self.offset_cutoff
    }

    /// Longest token accepted by [`decode`](Self::decode)
    #[must_use]
    pub const fn max_token_len(&self) -> usize {
        self.max_token_len
    }

    #[must_use]
    pub fn encode(&self, cursor: &Cursor) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if cursor.offset != 0 {
            serializer.append_pair("o", &cursor.offset.to_string());
        }
        if cursor.reverse {
            serializer.append_pair("r", "1");
        }
        if let Some(position) = &cursor.position {
            serializer.append_pair("p", position);
        }
        TOKEN_ENGINE.encode(serializer.finish())
    }

    /// Decode a token, `None` when it is malformed or too long
    ///
    /// Offsets are clamped to `[0, offset_cutoff]`; any non-zero `r` reads as
    /// reverse. Only the first occurrence of each key counts.
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<Cursor> {
        if token.len() > self.max_token_len {
            tracing::debug!(
                len = token.len(),
                max = self.max_token_len,
                "cursor token too long"
            );
            return None;
        }

        match self.parse(token) {
            Ok(cursor) => Some(cursor),
            Err(reason) => {
                tracing::debug!(reason, "ignoring malformed cursor");
                None
            }
        }
    }

    fn parse(&self, token: &str) -> std::result::Result<Cursor, &'static str> {
        let bytes = TOKEN_ENGINE
            .decode(token.as_bytes())
            .map_err(|_| "invalid base64")?;
        let text = String::from_utf8(bytes).map_err(|_| "invalid utf-8")?;

        let mut offset = None;
        let mut reverse = None;
        let mut position = None;
        for (key, value) in form_urlencoded::parse(text.as_bytes()) {
            match key.as_ref() {
                "o" if offset.is_none() => offset = Some(value.into_owned()),
                "r" if reverse.is_none() => reverse = Some(value.into_owned()),
                "p" if position.is_none() => position = Some(value.into_owned()),
                _ => {}
            }
        }

        let offset: i64 = offset
            .as_deref()
            .unwrap_or("0")
            .parse()
            .map_err(|_| "offset is not an integer")?;
        let reverse: i64 = reverse
            .as_deref()
            .unwrap_or("0")
            .parse()
            .map_err(|_| "reverse flag is not an integer")?;

        Ok(Cursor {
            offset: u64::try_from(offset).unwrap_or(0).min(self.offset_cutoff),
            reverse: reverse != 0,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn codec() -> CursorCodec {
        CursorCodec::new(1000, 4096)
    }

    fn raw(query: &str) -> String {
        TOKEN_ENGINE.encode(query)
    }

    #[test]
    fn test_default_cursor_encodes_empty() {
        assert_eq!(codec().encode(&Cursor::default()), "");
        assert_eq!(codec().decode(""), Some(Cursor::default()));
    }

    #[test]
    fn test_encode_omits_defaults() {
        let token = codec().encode(&Cursor::new(0, false, Some("42".to_string())));
        assert_eq!(token, raw("p=42"));

        let token = codec().encode(&Cursor::new(3, true, None));
        assert_eq!(token, raw("o=3&r=1"));
    }

    #[test]
    fn test_round_trip_with_special_characters() {
        let cursor = Cursor::new(7, false, Some("a b&c=d/é".to_string()));
        let token = codec().encode(&cursor);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(codec().decode(&token), Some(cursor));
    }

    #[test]
    fn test_decode_accepts_padding() {
        // 4 bytes encode with two padding characters
        let padded = STANDARD.encode("p=10");
        assert!(padded.ends_with('='));
        assert_eq!(
            codec().decode(&padded),
            Some(Cursor::new(0, false, Some("10".to_string())))
        );
    }

    #[test]
    fn test_decode_clamps_offset() {
        assert_eq!(codec().decode(&raw("o=5000")).unwrap().offset, 1000);
        assert_eq!(codec().decode(&raw("o=-4")).unwrap().offset, 0);
        assert_eq!(CursorCodec::new(10, 4096).decode(&raw("o=11")).unwrap().offset, 10);
    }

    #[test]
    fn test_decode_any_nonzero_reverse() {
        assert!(codec().decode(&raw("r=2")).unwrap().reverse);
        assert!(codec().decode(&raw("r=-1")).unwrap().reverse);
        assert!(!codec().decode(&raw("r=0")).unwrap().reverse);
    }

    #[test]
    fn test_decode_first_occurrence_wins() {
        let cursor = codec().decode(&raw("p=a&p=b&o=1&o=2")).unwrap();
        assert_eq!(cursor.position.as_deref(), Some("a"));
        assert_eq!(cursor.offset, 1);
    }

    #[test]
    fn test_decode_blank_position_is_kept() {
        assert_eq!(codec().decode(&raw("p=")).unwrap().position.as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(codec().decode("not base64!"), None);
        assert_eq!(codec().decode(&raw("o=abc")), None);
        assert_eq!(codec().decode(&raw("r=yes")), None);
        assert_eq!(codec().decode(&TOKEN_ENGINE.encode([0xff_u8, 0xfe, 0x00])), None);
    }

    #[test]
    fn test_oversized_token_rejected() {
        let codec = CursorCodec::new(1000, 8);
        let token = codec.encode(&Cursor::new(0, false, Some("long position".to_string())));
        assert!(token.len() > 8);
        assert_eq!(codec.decode(&token), None);
    }
}
