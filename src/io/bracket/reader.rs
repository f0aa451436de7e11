//! Dot-bracket reader.
//!
//! A record is an optional `>name` line followed by sequence lines and notation lines.
//! Consecutive lines of the same kind are concatenated, and a new `>` line closes the
//! record in progress. Trailing annotations after the notation (such as a folding energy)
//! are ignored.

use crate::io::context::IoContext;
use crate::io::error::Error;
use crate::model::notation::{self, UNPAIRED};
use crate::model::rna::Rna;
use crate::model::secondary::SecondaryStructure;
use log::{debug, info};
use rand::Rng;
use std::io::BufRead;

const FORMAT: &str = "dot-bracket";
const UNNAMED: &str = "unnamed";

#[derive(Default)]
struct Record {
    name: Option<String>,
    sequence: String,
    notation: String,
}

impl Record {
    fn has_content(&self) -> bool {
        !self.sequence.is_empty() || !self.notation.is_empty()
    }

    fn build(self, rng: &mut impl Rng) -> Result<SecondaryStructure, Error> {
        let name = self.name.unwrap_or_else(|| UNNAMED.to_string());

        if self.sequence.is_empty() {
            debug!("record '{}' has no sequence; generating one", name);
            let rna = Rna::random(&name, self.notation.chars().count(), rng);
            let mut structure = SecondaryStructure::from_bracket(rna, &self.notation)
                .map_err(|e| Error::notation(FORMAT, e))?;
            structure.resample_paired_bases(rng);
            return Ok(structure);
        }

        let notation = if self.notation.is_empty() {
            UNPAIRED.to_string().repeat(self.sequence.chars().count())
        } else {
            self.notation
        };
        SecondaryStructure::from_bracket(Rna::new(&name, &self.sequence), &notation)
            .map_err(|e| Error::notation(FORMAT, e))
    }
}

enum LineKind<'a> {
    Sequence(&'a str),
    Notation(&'a str),
    Other,
}

fn classify_line(line: &str) -> LineKind<'_> {
    let Some(token) = line.split_whitespace().next() else {
        return LineKind::Other;
    };

    if token.chars().all(|c| c.is_ascii_alphabetic()) {
        return LineKind::Sequence(token);
    }

    let has_bracket = token.chars().any(notation::is_bracket_symbol);
    let all_symbols = token
        .chars()
        .all(|c| notation::is_bracket_symbol(c) || c.is_ascii_alphabetic());
    if has_bracket && all_symbols {
        LineKind::Notation(token)
    } else {
        LineKind::Other
    }
}

/// Parses every record of a dot-bracket stream.
///
/// Records without a sequence receive a random one whose paired positions are resampled to
/// canonical combinations. The random source honours [`IoContext::with_rng_seed`].
///
/// # Errors
///
/// Returns [`Error::Notation`] for unbalanced brackets or a sequence/notation length
/// mismatch, and [`Error::Io`] when the reader fails.
///
/// # Examples
///
/// ```
/// use rna_forge::io::{read_bracket, IoContext};
/// use std::io::Cursor;
///
/// let input = ">hairpin\nGGGAAACCC\n(((...)))\n";
/// let structures = read_bracket(Cursor::new(input), &IoContext::new_default()).unwrap();
/// assert_eq!(structures[0].name(), "hairpin");
/// assert_eq!(structures[0].secondaries().len(), 3);
/// ```
pub fn read<R: BufRead>(
    reader: R,
    context: &IoContext,
) -> Result<Vec<SecondaryStructure>, Error> {
    let mut rng = context.rng();
    let mut structures = Vec::new();
    let mut record = Record::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(Error::from_io)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(name) = trimmed.strip_prefix('>') {
            if record.has_content() {
                structures.push(std::mem::take(&mut record).build(&mut rng)?);
            }
            record.name = Some(name.trim().to_string());
            continue;
        }

        match classify_line(trimmed) {
            LineKind::Sequence(seq) => record.sequence.push_str(&seq.to_ascii_uppercase()),
            LineKind::Notation(symbols) => record.notation.push_str(symbols),
            LineKind::Other => debug!("skipping line {}: {:?}", index + 1, trimmed),
        }
    }

    if record.has_content() {
        structures.push(record.build(&mut rng)?);
    }

    info!("parsed {} dot-bracket records", structures.len());
    Ok(structures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str) -> Result<Vec<SecondaryStructure>, Error> {
        read(
            Cursor::new(input.as_bytes()),
            &IoContext::new_default().with_rng_seed(7),
        )
    }

    #[test]
    fn read_concatenates_wrapped_lines() {
        let structures = parse(">wrapped\nGGGA\nAACCC\n(((..\n.)))\n").expect("parse");
        assert_eq!(structures.len(), 1);
        assert_eq!(structures[0].rna.sequence(), "GGGAAACCC");
        assert_eq!(structures[0].to_bracket(), "(((...)))");
    }

    #[test]
    fn read_splits_records_at_name_lines() {
        let input = ">one\nGAAAC\n(...)\n\n>two\nacgu\n.().\n";
        let structures = parse(input).expect("parse");
        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0].name(), "one");
        assert_eq!(structures[1].name(), "two");
        assert_eq!(structures[1].rna.sequence(), "ACGU");
    }

    #[test]
    fn read_ignores_trailing_energy_annotations() {
        let structures = parse("GGGAAACCC\n(((...))) (-3.40)\n").expect("parse");
        assert_eq!(structures[0].name(), UNNAMED);
        assert_eq!(structures[0].secondaries().len(), 3);
    }

    #[test]
    fn read_keeps_pseudoknot_layers() {
        let structures = parse(">pk\nGGAAGGAACCAACC\n((..[[..))..]]\n").expect("parse");
        let ss = &structures[0];
        assert_eq!(ss.secondaries().len(), 2);
        assert_eq!(ss.tertiaries().len(), 2);
        assert_eq!(ss.to_bracket(), "((..[[..))..]]");
    }

    #[test]
    fn read_generates_pair_consistent_sequence_when_missing() {
        let structures = parse(">nosequence\n((((....))))\n").expect("parse");
        let ss = &structures[0];
        assert_eq!(ss.length(), 12);
        for pair in ss.secondaries() {
            let five = ss.rna.residue_at(pair.start()).unwrap();
            let three = ss.rna.residue_at(pair.end()).unwrap();
            assert!(
                matches!(
                    (five, three),
                    ('A', 'U') | ('U', 'A') | ('G', 'C') | ('C', 'G') | ('G', 'U') | ('U', 'G')
                ),
                "non-canonical pair {five}{three}"
            );
        }
    }

    #[test]
    fn read_rejects_unbalanced_notation() {
        let err = parse(">bad\nGGAAC\n((..)\n").expect_err("should fail");
        assert!(matches!(err, Error::Notation { .. }));
    }

    #[test]
    fn read_rejects_length_mismatch() {
        let err = parse(">bad\nGGAA\n(...)\n").expect_err("should fail");
        assert!(matches!(err, Error::Notation { .. }));
    }
}
