// SPDX-License-Identifier: Apache-2.0

/// Concatenates the residue lines of a FASTA body; `>` headers and `;`
/// comments are dropped.
#[must_use]
pub fn parse_fasta_sequence(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('>') && !line.starts_with(';'))
        .collect()
}
