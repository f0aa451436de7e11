//! Connectivity-table readers.
//!
//! Both dialects list one position per row together with its base and pairing partner
//! (`0` when unpaired). CT rows carry six whitespace-separated columns
//! (`index base previous next partner number`) and a `<length> <title>` header; BPSeq rows
//! carry three (`index base partner`) and may be preceded by `Filename:` and other
//! comment lines. Rows that do not match the dialect's shape are skipped.

use crate::io::error::Error;
use crate::model::base_pair::BasePair;
use crate::model::rna::Rna;
use crate::model::secondary::SecondaryStructure;
use log::{debug, info, warn};
use std::io::BufRead;

/// Column layout of a connectivity-table dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Ct,
    BpSeq,
}

impl Dialect {
    fn name(self) -> &'static str {
        match self {
            Dialect::Ct => "CT",
            Dialect::BpSeq => "BPSeq",
        }
    }

    fn columns(self) -> usize {
        match self {
            Dialect::Ct => 6,
            Dialect::BpSeq => 3,
        }
    }

    fn partner_column(self) -> usize {
        match self {
            Dialect::Ct => 4,
            Dialect::BpSeq => 2,
        }
    }
}

/// Reads a CT file.
///
/// # Examples
///
/// ```
/// use rna_forge::io::read_ct;
/// use std::io::Cursor;
///
/// let ct = "5 demo\n1 A 0 2 0 1\n2 U 1 3 4 2\n3 G 2 4 0 3\n4 C 3 5 2 4\n5 A 4 0 0 5\n";
/// let ss = read_ct(Cursor::new(ct)).unwrap();
/// assert_eq!(ss.name(), "demo");
/// assert_eq!(ss.to_bracket(), ".(.).");
/// ```
pub fn read_ct<R: BufRead>(reader: R) -> Result<SecondaryStructure, Error> {
    read(reader, Dialect::Ct)
}

/// Reads a BPSeq file.
pub fn read_bpseq<R: BufRead>(reader: R) -> Result<SecondaryStructure, Error> {
    read(reader, Dialect::BpSeq)
}

/// Reads either dialect into a single structure.
///
/// # Errors
///
/// Returns [`Error::Format`] when a well-shaped row has a non-numeric partner, and
/// [`Error::Io`] when the reader fails.
pub fn read<R: BufRead>(reader: R, dialect: Dialect) -> Result<SecondaryStructure, Error> {
    let mut name: Option<String> = None;
    let mut sequence = String::new();
    let mut pairs = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        let line = line.map_err(Error::from_io)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if dialect == Dialect::BpSeq {
            if let Some(filename) = trimmed.strip_prefix("Filename:") {
                name.get_or_insert_with(|| filename.trim().to_string());
                continue;
            }
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let position = fields
            .first()
            .and_then(|f| f.parse::<usize>().ok())
            .filter(|_| fields.len() == dialect.columns());

        let Some(position) = position else {
            if dialect == Dialect::Ct && name.is_none() && sequence.is_empty() {
                name = header_title(&fields);
            }
            debug!("skipping {} line {}: {:?}", dialect.name(), line_num, trimmed);
            continue;
        };

        let partner = fields[dialect.partner_column()]
            .parse::<usize>()
            .map_err(|_| {
                Error::format(
                    dialect.name(),
                    line_num,
                    format!("Invalid partner index '{}'", fields[dialect.partner_column()]),
                )
            })?;

        sequence.push_str(&fields[1].to_ascii_uppercase());
        if partner > position {
            pairs.push(BasePair::new(position, partner));
        }
    }

    let length = sequence.chars().count();
    pairs.retain(|pair: &BasePair| {
        let in_range = pair.end() <= length;
        if !in_range {
            warn!(
                "dropping {} pair {}-{}: partner beyond {} residues",
                dialect.name(),
                pair.start(),
                pair.end(),
                length
            );
        }
        in_range
    });

    let name = name.unwrap_or_default();
    info!(
        "parsed {} '{}' with {} residues and {} pairs",
        dialect.name(),
        name,
        sequence.len(),
        pairs.len()
    );

    Ok(SecondaryStructure::from_base_pairs(
        Rna::new(&name, &sequence),
        pairs,
    ))
}

/// Title of a CT header row (`<length> <title...>`).
fn header_title(fields: &[&str]) -> Option<String> {
    match fields {
        [length, title @ ..] if length.parse::<usize>().is_ok() && !title.is_empty() => {
            Some(title.join(" "))
        }
        _ => None,
    }
}
