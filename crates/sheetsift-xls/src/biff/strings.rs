//! BIFF8 Unicode string decoding.
//!
//! BIFF8 strings have a complex encoding:
//! - Header: char_count (2 bytes) + flags (1 byte)
//! - Flags bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = uncompressed UTF-16LE
//! - Flags bit 2 (`fExtSt`): extended string data follows (Asian phonetic)
//! - Flags bit 3 (`fRichSt`): rich text run array follows
//! - If fRichSt: 2-byte run count follows the flags
//! - If fExtSt: 4-byte extended data size follows
//! - Then the character data
//! - Then the rich text runs (4 bytes each) if fRichSt
//! - Then the extended data if fExtSt
//!
//! In SST records, strings can span CONTINUE records. The CONTINUE record
//! can change the encoding (compressed or uncompressed) mid-string via a
//! new flags byte at the start of the continuation.

use super::parser::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

const FLAG_HIGH_BYTE: u8 = 0x01;
const FLAG_EXT: u8 = 0x04;
const FLAG_RICH: u8 = 0x08;

/// Read a BIFF8 "short" string (1-byte length prefix, used in BOUNDSHEET etc.).
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    read_character_data(data, offset, char_count, flags & FLAG_HIGH_BYTE != 0, &[])
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (LABEL, STRING, ...).
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    read_string_with_continues(data, offset, &[])
}

/// Read a 2-byte-length Unicode string whose character data may cross the
/// CONTINUE boundaries listed in `continues`.
fn read_string_with_continues(
    data: &[u8],
    offset: &mut usize,
    continues: &[usize],
) -> XlsResult<String> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let run_count = if flags & FLAG_RICH != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let ext_size = if flags & FLAG_EXT != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let text = read_character_data(
        data,
        offset,
        char_count,
        flags & FLAG_HIGH_BYTE != 0,
        continues,
    )?;

    // Formatting runs (4 bytes each) and phonetic data carry no flag bytes
    *offset += run_count * 4 + ext_size;

    Ok(text)
}

/// Read `char_count` characters, re-reading the encoding flag at every
/// CONTINUE boundary the data crosses.
fn read_character_data(
    data: &[u8],
    offset: &mut usize,
    char_count: usize,
    mut is_wide: bool,
    continues: &[usize],
) -> XlsResult<String> {
    let mut units: Vec<u16> = Vec::with_capacity(char_count);
    let mut remaining = char_count;

    // Character data that opens a continuation gets its own flags byte too
    if remaining > 0 && continues.contains(offset) {
        is_wide = read_u8(data, offset)? & FLAG_HIGH_BYTE != 0;
    }

    while remaining > 0 {
        let segment_end = continues
            .iter()
            .copied()
            .find(|&b| b > *offset)
            .unwrap_or(data.len())
            .min(data.len());

        let width = if is_wide { 2 } else { 1 };
        let available = segment_end.saturating_sub(*offset) / width;
        let n = available.min(remaining);

        let bytes = &data[*offset..*offset + n * width];
        if is_wide {
            units.extend(bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])));
        } else {
            units.extend(bytes.iter().map(|&b| u16::from(b)));
        }
        *offset += n * width;
        remaining -= n;

        if remaining == 0 {
            break;
        }
        if *offset != segment_end || segment_end == data.len() {
            return Err(XlsError::Parse(format!(
                "string data too short: {} characters missing at offset {}",
                remaining, *offset
            )));
        }
        // Continuation starts with a fresh flags byte
        is_wide = read_u8(data, offset)? & FLAG_HIGH_BYTE != 0;
    }

    String::from_utf16(&units).map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
}

/// Parse the SST (Shared String Table) from its merged record body.
///
/// The SST body starts with:
/// - `total_strings` (4 bytes, u32): total string refs in workbook
/// - `unique_strings` (4 bytes, u32): number of unique strings in this table
/// - Then `unique_strings` Unicode string entries
pub fn parse_sst(data: &[u8], continues: &[usize]) -> XlsResult<Vec<String>> {
    let mut offset = 0;

    let _total_strings = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    let mut strings = Vec::with_capacity(unique_count.min(data.len()));

    for i in 0..unique_count {
        match read_string_with_continues(data, &mut offset, continues) {
            Ok(s) => strings.push(s),
            Err(e) => {
                // Some writers pad or truncate the table; keep what was read
                log::warn!("xls: SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}
