//! SAUCE metadata record
//!
//! A 128-byte record appended to text-art files, optionally preceded by a
//! comment block (`COMNT` followed by 64-byte lines).

/// Size of the trailing record
pub const RECORD_LEN: usize = 128;
/// Size of one comment line
pub const COMMENT_LINE_LEN: usize = 64;
const COMMENT_ID: &[u8] = b"COMNT";
const SAUCE_ID: &[u8] = b"SAUCE";

/// Parsed SAUCE record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sauce {
    pub version: String,
    pub title: String,
    pub author: String,
    pub group: String,
    /// CCYYMMDD
    pub date: String,
    pub file_size: u32,
    pub data_type: u8,
    pub file_type: u8,
    /// Declared width in characters for character-based files
    pub tinfo1: u16,
    /// Declared height in lines for character-based files
    pub tinfo2: u16,
    pub tinfo3: u16,
    pub tinfo4: u16,
    pub comments: Vec<String>,
    pub flags: u8,
    /// Non-blink mode requested (iCE colors)
    pub ice_colors: bool,
    /// 0 = legacy, 1 = 8 pixel, 2 = 9 pixel
    pub letter_spacing: u8,
    /// 0 = legacy, 1 = stretch, 2 = square
    pub aspect_ratio: u8,
    /// Font name hint
    pub tinfo_s: String,
}

impl Sauce {
    /// Parse the record at the end of `bytes`, if present
    pub fn parse(bytes: &[u8]) -> Option<Sauce> {
        if bytes.len() < RECORD_LEN {
            return None;
        }
        let start = bytes.len() - RECORD_LEN;
        let record = &bytes[start..];
        if &record[..5] != SAUCE_ID {
            return None;
        }

        let u16_at = |i: usize| u16::from_le_bytes([record[i], record[i + 1]]);
        let flags = record[105];
        let comment_lines = record[104] as usize;

        Some(Sauce {
            version: text(&record[5..7]),
            title: text(&record[7..42]),
            author: text(&record[42..62]),
            group: text(&record[62..82]),
            date: text(&record[82..90]),
            file_size: u32::from_le_bytes([record[90], record[91], record[92], record[93]]),
            data_type: record[94],
            file_type: record[95],
            tinfo1: u16_at(96),
            tinfo2: u16_at(98),
            tinfo3: u16_at(100),
            tinfo4: u16_at(102),
            comments: read_comments(&bytes[..start], comment_lines),
            flags,
            ice_colors: flags & 0x01 != 0,
            letter_spacing: (flags >> 1) & 0x03,
            aspect_ratio: (flags >> 3) & 0x03,
            tinfo_s: zstring(&record[106..128]),
        })
    }

    /// Number of trailing bytes occupied by the record and its comments
    pub fn trailer_len(&self) -> usize {
        if self.comments.is_empty() {
            RECORD_LEN
        } else {
            RECORD_LEN + COMMENT_ID.len() + self.comments.len() * COMMENT_LINE_LEN
        }
    }

    /// Declared column count, if any
    pub fn columns(&self) -> Option<u16> {
        (self.tinfo1 > 0).then_some(self.tinfo1)
    }
}

/// Comment lines directly before the record, empty when malformed
fn read_comments(before: &[u8], lines: usize) -> Vec<String> {
    if lines == 0 {
        return Vec::new();
    }
    let block_len = COMMENT_ID.len() + lines * COMMENT_LINE_LEN;
    if before.len() < block_len {
        return Vec::new();
    }
    let block = &before[before.len() - block_len..];
    if &block[..COMMENT_ID.len()] != COMMENT_ID {
        return Vec::new();
    }
    block[COMMENT_ID.len()..]
        .chunks_exact(COMMENT_LINE_LEN)
        .map(text)
        .collect()
}

/// Bytewise (CP437 as Latin-1) decode, trailing spaces and NULs trimmed
fn text(bytes: &[u8]) -> String {
    let s: String = bytes.iter().map(|&b| b as char).collect();
    s.trim_end_matches([' ', '\0']).to_string()
}

fn zstring(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    text(&bytes[..end])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn pad(s: &str, len: usize) -> Vec<u8> {
        let mut v = s.as_bytes().to_vec();
        v.resize(len, b' ');
        v
    }

    /// Build a SAUCE trailer for tests
    pub(crate) fn record(title: &str, tinfo1: u16, flags: u8, comments: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        if !comments.is_empty() {
            out.extend_from_slice(COMMENT_ID);
            for line in comments {
                out.extend(pad(line, COMMENT_LINE_LEN));
            }
        }
        out.extend_from_slice(SAUCE_ID);
        out.extend_from_slice(b"00");
        out.extend(pad(title, 35));
        out.extend(pad("artist", 20));
        out.extend(pad("group", 20));
        out.extend_from_slice(b"19960401");
        out.extend_from_slice(&1234u32.to_le_bytes());
        out.push(1);
        out.push(1);
        out.extend_from_slice(&tinfo1.to_le_bytes());
        out.extend_from_slice(&25u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.push(comments.len() as u8);
        out.push(flags);
        let mut font = b"IBM VGA".to_vec();
        font.resize(22, 0);
        out.extend(font);
        out
    }

    #[test]
    fn test_parse_fields() {
        let mut bytes = b"hello".to_vec();
        bytes.extend(record("Dark Star", 132, 0b0001_0101, &[]));

        let sauce = Sauce::parse(&bytes).unwrap();
        assert_eq!(sauce.version, "00");
        assert_eq!(sauce.title, "Dark Star");
        assert_eq!(sauce.author, "artist");
        assert_eq!(sauce.group, "group");
        assert_eq!(sauce.date, "19960401");
        assert_eq!(sauce.file_size, 1234);
        assert_eq!(sauce.columns(), Some(132));
        assert_eq!(sauce.tinfo2, 25);
        assert!(sauce.ice_colors);
        assert_eq!(sauce.letter_spacing, 2);
        assert_eq!(sauce.aspect_ratio, 2);
        assert_eq!(sauce.tinfo_s, "IBM VGA");
        assert_eq!(sauce.trailer_len(), 128);
    }

    #[test]
    fn test_parse_comments() {
        let mut bytes = b"art".to_vec();
        bytes.extend(record("t", 80, 0, &["first line", "second"]));

        let sauce = Sauce::parse(&bytes).unwrap();
        assert_eq!(sauce.comments, vec!["first line", "second"]);
        assert_eq!(sauce.trailer_len(), 128 + 5 + 128);
    }

    #[test]
    fn test_missing_record() {
        assert_eq!(Sauce::parse(b"plain text"), None);
        assert_eq!(Sauce::parse(&[b'x'; 200]), None);
    }

    #[test]
    fn test_malformed_comment_block_ignored() {
        let mut rec = record("t", 80, 0, &[]);
        rec[104] = 3;
        let sauce = Sauce::parse(&rec).unwrap();
        assert!(sauce.comments.is_empty());
        assert_eq!(sauce.trailer_len(), 128);
    }
}
