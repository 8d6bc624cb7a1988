// SPDX-License-Identifier: Apache-2.0

use mgv_core::{Error, Result};
use mgv_model::{Strand, TrackRecord};
use std::collections::BTreeMap;

/// Decodes a GFF3 body into records, preserving source order.
/// Blank lines and `#` directives are skipped.
pub fn parse_gff3(text: &str) -> Result<Vec<TrackRecord>> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        out.push(parse_line(line).map_err(|e| {
            Error::decode(format!("gff3 line {}: {}", lineno + 1, e.message))
        })?);
    }
    Ok(out)
}

fn parse_line(line: &str) -> Result<TrackRecord> {
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 9 {
        return Err(Error::decode(format!(
            "expected 9 columns, found {}",
            cols.len()
        )));
    }
    let start: u64 = cols[3]
        .parse()
        .map_err(|_| Error::decode(format!("invalid start coordinate: {}", cols[3])))?;
    let end: u64 = cols[4]
        .parse()
        .map_err(|_| Error::decode(format!("invalid end coordinate: {}", cols[4])))?;
    if start == 0 || end < start {
        return Err(Error::decode(format!("invalid coordinate span: {start}-{end}")));
    }
    Ok(TrackRecord {
        seqid: cols[0].trim().to_string(),
        source: cols[1].trim().to_string(),
        feature_type: cols[2].trim().to_string(),
        start,
        end,
        score: dot_as_none(cols[5]),
        strand: Strand::parse(cols[6].trim())?,
        phase: dot_as_none(cols[7]),
        attrs: parse_attributes(cols[8]),
    })
}

fn dot_as_none(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (raw != "." && !raw.is_empty()).then(|| raw.to_string())
}

fn parse_attributes(raw: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for token in raw.split(';') {
        let t = token.trim();
        if t.is_empty() {
            continue;
        }
        if let Some((k, v)) = t.split_once('=') {
            out.insert(
                percent_decode(k.trim()),
                percent_decode(v.trim().trim_matches('"')),
            );
        }
    }
    out
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let h1 = bytes[i + 1] as char;
            let h2 = bytes[i + 2] as char;
            if let (Some(a), Some(b)) = (h1.to_digit(16), h2.to_digit(16)) {
                out.push(((a << 4) + b) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
