//! ToUnicode CMap parser.
//!
//! ToUnicode streams map font-local character codes (CIDs for composite
//! fonts) to Unicode. Only the `bfchar` and `bfrange` operators carry
//! mappings; everything else in the stream (codespace ranges, the CMap
//! header dictionary, PostScript boilerplate) is skipped.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;

/// Largest number of codes a single sequential bfrange may expand to.
const MAX_RANGE_SPAN: u32 = 0x1_0000;

/// Mapping from CIDs to Unicode text for one font.
///
/// Built once per font per document and read concurrently afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontCMap {
    map: HashMap<u32, String>,
    unsupported_ranges: usize,
}

impl FontCMap {
    /// Parse a decompressed ToUnicode CMap stream.
    ///
    /// ```text
    /// beginbfchar
    /// <0041> <0041>            % 0x41 -> "A"
    /// <000C> <00660069>        % 0x0C -> "fi"
    /// endbfchar
    /// beginbfrange
    /// <0020> <007E> <0020>     % sequential: 0x20..0x7E -> U+0020..U+007E
    /// <005F> <0061> [<00660066> <00660069> <00660066006C>]
    /// endbfrange
    /// ```
    ///
    /// Destinations are UTF-16BE hex strings; surrogate pairs decode to one
    /// scalar. A sequential bfrange whose destination is more than one scalar
    /// is not expanded: it is counted in [`FontCMap::unsupported_ranges`] and
    /// its codes stay unmapped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CMap`] when a mapping section is opened but never
    /// closed (truncated stream).
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::fonts::FontCMap;
    ///
    /// let cmap = FontCMap::parse(b"beginbfrange\n<0001> <0003> <0041>\nendbfrange").unwrap();
    /// assert_eq!(cmap.get(2), Some("B"));
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self> {
        let content = String::from_utf8_lossy(data);
        let mut cmap = FontCMap::default();

        for section in extract_sections(&content, "beginbfchar", "endbfchar")? {
            cmap.parse_bfchar_section(section);
        }
        for section in extract_sections(&content, "beginbfrange", "endbfrange")? {
            cmap.parse_bfrange_section(section);
        }

        log::debug!(
            "Parsed ToUnicode CMap: {} mappings, {} unsupported ranges",
            cmap.map.len(),
            cmap.unsupported_ranges
        );
        Ok(cmap)
    }

    /// Build a CMap from explicit entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            map: entries.into_iter().collect(),
            unsupported_ranges: 0,
        }
    }

    /// Unicode text for a CID.
    pub fn get(&self, cid: u32) -> Option<&str> {
        self.map.get(&cid).map(String::as_str)
    }

    /// Number of mapped CIDs.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no CID is mapped.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of sequential bfrange entries that could not be expanded.
    pub fn unsupported_ranges(&self) -> usize {
        self.unsupported_ranges
    }

    fn parse_bfchar_section(&mut self, section: &str) {
        lazy_static::lazy_static! {
            static ref RE: Regex = Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]*)>").unwrap();
        }

        for caps in RE.captures_iter(section) {
            let Ok(src) = u32::from_str_radix(&caps[1], 16) else {
                continue;
            };
            match decode_utf16_hex(&caps[2]) {
                Some(dst) if !dst.is_empty() => {
                    log::trace!("ToUnicode bfchar: 0x{:04X} -> {:?}", src, dst);
                    self.map.insert(src, dst);
                },
                _ => log::trace!("ToUnicode bfchar: 0x{:04X} has undecodable destination", src),
            }
        }
    }

    fn parse_bfrange_section(&mut self, section: &str) {
        lazy_static::lazy_static! {
            static ref RE: Regex = Regex::new(
                r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*(?:<([0-9A-Fa-f]+)>|\[([^\]]*)\])"
            ).unwrap();
            static ref RE_HEX: Regex = Regex::new(r"<([0-9A-Fa-f]*)>").unwrap();
        }

        for caps in RE.captures_iter(section) {
            let (Ok(start), Ok(end)) =
                (u32::from_str_radix(&caps[1], 16), u32::from_str_radix(&caps[2], 16))
            else {
                continue;
            };
            if end < start {
                log::trace!("ToUnicode bfrange: inverted range 0x{:X}-0x{:X}", start, end);
                continue;
            }

            if let Some(dst) = caps.get(3) {
                self.expand_sequential(start, end, dst.as_str());
            } else if let Some(array) = caps.get(4) {
                let destinations: Vec<&str> = RE_HEX
                    .captures_iter(array.as_str())
                    .filter_map(|c| c.get(1).map(|m| m.as_str()))
                    .collect();
                let span = (end - start) as usize + 1;
                if destinations.len() != span {
                    log::warn!(
                        "ToUnicode bfrange array size mismatch: expected {} entries for range 0x{:X}-0x{:X}, got {}",
                        span,
                        start,
                        end,
                        destinations.len()
                    );
                }
                for (offset, hex) in destinations.into_iter().take(span).enumerate() {
                    if let Some(dst) = decode_utf16_hex(hex).filter(|d| !d.is_empty()) {
                        self.map.insert(start + offset as u32, dst);
                    }
                }
            }
        }
    }

    fn expand_sequential(&mut self, start: u32, end: u32, dst_hex: &str) {
        let Some(dst) = decode_utf16_hex(dst_hex) else {
            log::trace!("ToUnicode bfrange: undecodable destination <{}>", dst_hex);
            return;
        };
        let mut scalars = dst.chars();
        let (Some(first), None) = (scalars.next(), scalars.next()) else {
            self.unsupported_ranges += 1;
            log::debug!(
                "ToUnicode bfrange 0x{:X}-0x{:X}: multi-scalar destination <{}> not expanded",
                start,
                end,
                dst_hex
            );
            return;
        };

        let span = (end - start).min(MAX_RANGE_SPAN - 1);
        if span < end - start {
            log::warn!("ToUnicode bfrange 0x{:X}-0x{:X} truncated to {} codes", start, end, span + 1);
        }
        let base = first as u32;
        for offset in 0..=span {
            if let Some(ch) = base.checked_add(offset).and_then(char::from_u32) {
                self.map.insert(start + offset, ch.to_string());
            }
        }
        log::trace!("ToUnicode bfrange: 0x{:X}-0x{:X} -> U+{:04X}..", start, start + span, base);
    }
}

/// Extract sections between begin and end markers.
fn extract_sections<'a>(content: &'a str, begin: &str, end: &str) -> Result<Vec<&'a str>> {
    let mut sections = Vec::new();
    let mut remaining = content;

    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        let Some(end_pos) = after_begin.find(end) else {
            return Err(Error::CMap(format!("'{}' without matching '{}'", begin, end)));
        };
        sections.push(&after_begin[..end_pos]);
        remaining = &after_begin[end_pos + end.len()..];
    }

    Ok(sections)
}

/// Decode a UTF-16BE hex string into text.
///
/// Groups of four hex digits are UTF-16 code units; a high surrogate followed
/// by a low surrogate becomes one scalar. Short strings (`<41>`) are read as a
/// single code unit. Returns `None` for odd-length multi-unit strings or
/// unpaired surrogates.
fn decode_utf16_hex(hex: &str) -> Option<String> {
    if hex.is_empty() {
        return Some(String::new());
    }
    if hex.len() <= 4 {
        let unit = u16::from_str_radix(hex, 16).ok()?;
        return char::decode_utf16([unit]).next()?.ok().map(String::from);
    }
    if hex.len() % 4 != 0 {
        return None;
    }

    let units = (0..hex.len())
        .step_by(4)
        .map(|i| u16::from_str_radix(&hex[i..i + 4], 16).ok())
        .collect::<Option<Vec<u16>>>()?;
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}
