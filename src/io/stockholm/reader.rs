//! Stockholm alignment reader.
//!
//! Each family (terminated by `//`) yields an [`Alignment`]: the raw aligned rows, a
//! consensus structure built from the `#=GC SS_cons` annotation over a synthetic sequence
//! of `N`, and one structure per aligned sequence projected onto its own ungapped
//! coordinates.
//!
//! Consensus pseudoknots are resolved against the alignment before projection. For each
//! pseudoknot the reader counts the sequences that lack every residue of the helix and the
//! sequences that lack every residue of the crossing pairs; the element deleted from fewer
//! sequences is kept as a retained location, which makes its pairs the nested layer of
//! every derived structure.

use crate::io::context::IoContext;
use crate::io::error::Error;
use crate::model::location::{Block, Location};
use crate::model::notation::UNPAIRED;
use crate::model::numbering::NumberingSystem;
use crate::model::rna::Rna;
use crate::model::secondary::SecondaryStructure;
use log::{debug, info, warn};
use std::io::BufRead;

const FORMAT: &str = "Stockholm";
const CONSENSUS_RESIDUE: char = 'N';

/// One alignment family with its consensus and per-sequence structures.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// `#=GF ID`
    pub id: Option<String>,
    /// `#=GF AC`
    pub accession: Option<String>,
    /// `#=GF DE`
    pub description: Option<String>,
    /// `#=GF TP`
    pub family_type: Option<String>,
    /// Aligned rows as `(name, residues)`, in first-seen order.
    pub aligned: Vec<(String, String)>,
    /// Structure over the alignment columns.
    pub consensus: SecondaryStructure,
    /// One structure per aligned row, gaps removed.
    pub structures: Vec<SecondaryStructure>,
}

impl Alignment {
    /// Number of alignment columns.
    pub fn columns(&self) -> usize {
        self.consensus.length()
    }
}

#[derive(Default)]
struct FamilyBuilder {
    id: Option<String>,
    accession: Option<String>,
    description: Option<String>,
    family_type: Option<String>,
    order: Vec<String>,
    rows: Vec<String>,
    ss_cons: String,
}

impl FamilyBuilder {
    fn has_content(&self) -> bool {
        !self.rows.is_empty() || !self.ss_cons.is_empty()
    }

    fn add_row(&mut self, name: &str, residues: &str) {
        match self.order.iter().position(|n| n == name) {
            Some(index) => self.rows[index].push_str(residues),
            None => {
                self.order.push(name.to_string());
                self.rows.push(residues.to_string());
            }
        }
    }

    fn add_feature(&mut self, tag: &str, value: &str) {
        let slot = match tag {
            "ID" => &mut self.id,
            "AC" => &mut self.accession,
            "DE" => &mut self.description,
            "TP" => &mut self.family_type,
            _ => return,
        };
        match slot {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(value);
            }
            None => *slot = Some(value.to_string()),
        }
    }

    fn finish(self, context: &IoContext, line_num: usize) -> Result<Alignment, Error> {
        let columns = if self.ss_cons.is_empty() {
            self.rows.first().map_or(0, |row| row.chars().count())
        } else {
            self.ss_cons.chars().count()
        };
        let notation = if self.ss_cons.is_empty() {
            UNPAIRED.to_string().repeat(columns)
        } else {
            translate_consensus(&self.ss_cons)
        };

        let rows: Vec<Vec<char>> = self.rows.iter().map(|r| r.chars().collect()).collect();
        for (name, row) in self.order.iter().zip(&rows) {
            if row.len() != columns {
                return Err(Error::format(
                    FORMAT,
                    line_num,
                    format!(
                        "Sequence '{}' spans {} columns but the alignment has {}",
                        name,
                        row.len(),
                        columns
                    ),
                ));
            }
        }

        let consensus_name = self
            .id
            .clone()
            .or_else(|| self.accession.clone())
            .unwrap_or_else(|| "consensus".to_string());
        let synthetic = CONSENSUS_RESIDUE.to_string().repeat(columns);

        let draft =
            SecondaryStructure::from_bracket(Rna::new(&consensus_name, &synthetic), &notation)
                .map_err(|e| Error::notation(FORMAT, e))?;
        let retained = resolve_pseudoknots(&draft, &rows, context);

        let mut consensus = SecondaryStructure::from_bracket_with_retained(
            Rna::new(&consensus_name, &synthetic),
            &notation,
            retained,
        )
        .map_err(|e| Error::notation(FORMAT, e))?;

        if context.consensus_statistics() {
            consensus.annotate_spreads(|location| {
                let counts: Vec<f64> = rows
                    .iter()
                    .map(|row| ungapped_count(row, location, context) as f64)
                    .collect();
                population_std(&counts)
            });
        }

        let notation: Vec<char> = notation.chars().collect();
        let structures = self
            .order
            .iter()
            .zip(&rows)
            .map(|(name, row)| project(name, row, &notation, &consensus, context))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "parsed alignment '{}' with {} sequences over {} columns",
            consensus_name,
            structures.len(),
            columns
        );

        Ok(Alignment {
            id: self.id,
            accession: self.accession,
            description: self.description,
            family_type: self.family_type,
            aligned: self.order.into_iter().zip(self.rows).collect(),
            consensus,
            structures,
        })
    }
}

/// Parses every family of a Stockholm stream.
///
/// # Errors
///
/// Returns [`Error::Format`] when an aligned row does not span the consensus columns,
/// [`Error::Notation`] when `SS_cons` is unbalanced, and [`Error::Io`] when the reader
/// fails.
///
/// # Examples
///
/// ```
/// use rna_forge::io::{read_stockholm, IoContext};
/// use std::io::Cursor;
///
/// let input = "# STOCKHOLM 1.0\n\
///              s1  GGAAACC\n\
///              s2  GG-AACC\n\
///              #=GC SS_cons <<...>>\n\
///              //\n";
/// let families = read_stockholm(Cursor::new(input), &IoContext::new_default()).unwrap();
/// assert_eq!(families[0].consensus.to_bracket(), "((...))");
/// assert_eq!(families[0].structures[1].to_bracket(), "((..))");
/// ```
pub fn read<R: BufRead>(reader: R, context: &IoContext) -> Result<Vec<Alignment>, Error> {
    let mut families = Vec::new();
    let mut family = FamilyBuilder::default();
    let mut last_line = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        last_line = line_num;
        let line = line.map_err(Error::from_io)?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed == "//" {
            let finished = std::mem::take(&mut family);
            if finished.has_content() {
                families.push(finished.finish(context, line_num)?);
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("#=GF") {
            if let Some((tag, value)) = rest.trim_start().split_once(char::is_whitespace) {
                family.add_feature(tag, value.trim());
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("#=GC") {
            if let Some(("SS_cons", value)) = rest.trim_start().split_once(char::is_whitespace)
            {
                family.ss_cons.push_str(value.trim());
            }
            continue;
        }

        if trimmed.starts_with('#') {
            continue;
        }

        match trimmed.split_once(char::is_whitespace) {
            Some((name, residues)) => family.add_row(name, residues.trim()),
            None => debug!("skipping Stockholm line {}: {:?}", line_num, trimmed),
        }
    }

    if family.has_content() {
        warn!("alignment ended without a '//' terminator");
        families.push(family.finish(context, last_line)?);
    }

    Ok(families)
}

/// Maps the `SS_cons` alphabet onto plain bracket notation.
fn translate_consensus(ss_cons: &str) -> String {
    ss_cons
        .chars()
        .map(|c| match c {
            '<' | '(' => '(',
            '>' | ')' => ')',
            ':' | ',' | '-' | '_' | '.' | '~' => UNPAIRED,
            other => other,
        })
        .collect()
}

/// Residues of `row` that fall inside `location` and are not gaps.
fn ungapped_count(row: &[char], location: &Location, context: &IoContext) -> usize {
    location
        .positions()
        .filter_map(|column| row.get(column - 1))
        .filter(|c| !context.is_gap(**c))
        .count()
}

fn deletion_count(rows: &[Vec<char>], location: &Location, context: &IoContext) -> usize {
    rows.iter()
        .filter(|row| ungapped_count(row, location, context) == 0)
        .count()
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Chooses, for every consensus pseudoknot, the location to keep nested.
///
/// The crossing pairs win only when strictly fewer sequences delete them than delete the
/// helix.
fn resolve_pseudoknots(
    consensus: &SecondaryStructure,
    rows: &[Vec<char>],
    context: &IoContext,
) -> Vec<Location> {
    let mut retained: Vec<Location> = Vec::new();

    for pseudoknot in consensus.pseudoknots() {
        let helix_location = &pseudoknot.helix.location;
        let tertiary_location = pseudoknot.tertiary_location();

        let helix_deletions = deletion_count(rows, helix_location, context);
        let tertiary_deletions = deletion_count(rows, &tertiary_location, context);
        debug!(
            "pseudoknot {}: helix deleted in {} sequences, crossing pairs {} at {}",
            helix_location, helix_deletions, tertiary_deletions, tertiary_location
        );

        let keep = if tertiary_deletions < helix_deletions {
            tertiary_location
        } else {
            helix_location.clone()
        };
        if !retained.contains(&keep) {
            retained.push(keep);
        }
    }

    retained
}

/// Projects the consensus onto one aligned row.
fn project(
    name: &str,
    row: &[char],
    notation: &[char],
    consensus: &SecondaryStructure,
    context: &IoContext,
) -> Result<SecondaryStructure, Error> {
    let is_gap = |column: usize| row.get(column - 1).is_none_or(|c| context.is_gap(*c));

    let mut symbols = notation.to_vec();
    for pair in consensus.base_pairs() {
        if is_gap(pair.start()) || is_gap(pair.end()) {
            symbols[pair.start() - 1] = UNPAIRED;
            symbols[pair.end() - 1] = UNPAIRED;
        }
    }

    let mut sequence = String::new();
    let mut own_notation = String::new();
    let mut numbering = NumberingSystem::new();
    let mut column_to_position = Vec::with_capacity(row.len());

    for (index, residue) in row.iter().enumerate() {
        if context.is_gap(*residue) {
            column_to_position.push(None);
            continue;
        }
        sequence.push(residue.to_ascii_uppercase());
        own_notation.push(symbols[index]);
        let position = sequence.len();
        numbering.insert(position, index + 1);
        column_to_position.push(Some(position));
    }

    let retained = consensus
        .retained_locations()
        .iter()
        .filter_map(|location| {
            let remapped = remap_location(location, &column_to_position);
            if remapped.is_none() {
                warn!(
                    "dropping retained location {} for sequence '{}': no ungapped boundary",
                    location, name
                );
            }
            remapped
        })
        .collect();

    let mut rna = Rna::new(name, &sequence);
    rna.alignment_numbering = Some(numbering);

    SecondaryStructure::from_bracket_with_retained(rna, &own_notation, retained)
        .map_err(|e| Error::notation(FORMAT, e))
}

/// Moves a location from alignment columns to ungapped positions.
fn remap_location(location: &Location, column_to_position: &[Option<usize>]) -> Option<Location> {
    let blocks = location
        .blocks()
        .iter()
        .map(|block| remap_block(block, column_to_position))
        .collect::<Option<Vec<_>>>()?;
    Some(Location::from_blocks(blocks))
}

/// Widens a block to the nearest ungapped columns at or beyond its boundaries: the start
/// scans toward column 1 and the end toward the last column.
fn remap_block(block: &Block, column_to_position: &[Option<usize>]) -> Option<Block> {
    let last_column = column_to_position.len();
    if block.start == 0 || block.end > last_column {
        return None;
    }
    let start = (1..=block.start)
        .rev()
        .find_map(|c| column_to_position[c - 1])?;
    let end = (block.end..=last_column).find_map(|c| column_to_position[c - 1])?;
    Some(Block::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str, context: &IoContext) -> Vec<Alignment> {
        read(Cursor::new(input.as_bytes()), context).expect("alignment should parse")
    }

    const PSEUDOKNOT_DATA: &str = "\
        # STOCKHOLM 1.0\n\
        #=GF ID   toy-pk\n\
        #=GF AC   RF99999\n\
        #=GF DE   Synthetic pseudoknot\n\
        #=GF TP   Gene; ncRNA;\n\
        \n\
        s1   --AAGGAA--AACC\n\
        s2   GGAAGGAACCAACC\n\
        #=GC SS_cons <<..[[..>>..]]\n\
        //\n";

    #[test]
    fn read_captures_family_features_and_rows() {
        let families = parse(PSEUDOKNOT_DATA, &IoContext::new_default());
        assert_eq!(families.len(), 1);

        let family = &families[0];
        assert_eq!(family.id.as_deref(), Some("toy-pk"));
        assert_eq!(family.accession.as_deref(), Some("RF99999"));
        assert_eq!(family.description.as_deref(), Some("Synthetic pseudoknot"));
        assert_eq!(family.family_type.as_deref(), Some("Gene; ncRNA;"));
        assert_eq!(family.aligned.len(), 2);
        assert_eq!(family.aligned[0].0, "s1");
        assert_eq!(family.columns(), 14);
        assert_eq!(family.consensus.rna.sequence(), "NNNNNNNNNNNNNN");
    }

    #[test]
    fn pseudoknot_keeps_the_less_deleted_element() {
        let families = parse(PSEUDOKNOT_DATA, &IoContext::new_default());
        let consensus = &families[0].consensus;

        let crossing = Location::from_positions([5, 6, 13, 14]);
        assert_eq!(consensus.retained_locations(), &[crossing]);

        let nested: Vec<_> = consensus
            .secondaries()
            .iter()
            .map(|p| (p.start(), p.end()))
            .collect();
        assert_eq!(nested, vec![(5, 14), (6, 13)]);
        assert_eq!(consensus.tertiaries().len(), 2);
    }

    #[test]
    fn ties_keep_the_helix() {
        let input = "\
            s1   GGAAGGAACCAACC\n\
            #=GC SS_cons <<..[[..>>..]]\n\
            //\n";
        let families = parse(input, &IoContext::new_default());
        let consensus = &families[0].consensus;
        assert_eq!(
            consensus.retained_locations(),
            &[Location::from_positions([1, 2, 9, 10])]
        );
        assert_eq!(consensus.secondaries()[0].start(), 1);
    }

    #[test]
    fn projection_clears_gapped_pairs_and_remaps_retained_blocks() {
        let families = parse(PSEUDOKNOT_DATA, &IoContext::new_default());
        let s1 = &families[0].structures[0];

        assert_eq!(s1.rna.sequence(), "AAGGAAAACC");
        assert_eq!(s1.to_bracket(), "..((....))");
        assert_eq!(
            s1.retained_locations(),
            &[Location::from_blocks([Block::new(3, 4), Block::new(9, 10)])]
        );

        let numbering = s1.rna.alignment_numbering.as_ref().expect("numbering");
        assert_eq!(numbering.get(1), Some(&3));
        assert_eq!(numbering.position_of(&13), Some(9));

        let s2 = &families[0].structures[1];
        assert_eq!(s2.secondaries().len(), 2);
        assert_eq!(s2.tertiaries().len(), 2);
    }

    #[test]
    fn derived_notation_matches_ungapped_length() {
        let input = "\
            # STOCKHOLM 1.0\n\
            a   GG-A.AC~C\n\
            b   G-GAAA_CC\n\
            c   ---AAA---\n\
            #=GC SS_cons ((-...,))\n\
            //\n";
        let ctx = IoContext::new_default();
        let families = parse(input, &ctx);

        for ((_, row), structure) in families[0].aligned.iter().zip(&families[0].structures) {
            let residues = row.chars().filter(|c| !ctx.is_gap(*c)).count();
            assert_eq!(structure.to_bracket().chars().count(), residues);
            assert_eq!(structure.length(), residues);
        }
        assert_eq!(families[0].structures[2].to_bracket(), "...");
    }

    #[test]
    fn retained_location_is_dropped_when_a_boundary_scan_runs_off_the_sequence() {
        let input = "\
            s1   GGAAGGAACCAACC\n\
            s2   GGAAGGAACCAACC\n\
            s3   --AA--AA--AA--\n\
            #=GC SS_cons <<..[[..>>..]]\n\
            //\n";
        let families = parse(input, &IoContext::new_default());
        let s3 = &families[0].structures[2];
        assert!(s3.retained_locations().is_empty());
        assert_eq!(s3.to_bracket(), "......");
    }

    #[test]
    fn interleaved_blocks_and_multiple_families() {
        let input = "\
            # STOCKHOLM 1.0\n\
            #=GF ID first\n\
            s1   GGGA\n\
            #=GC SS_cons <<<.\n\
            \n\
            s1   AACCC\n\
            #=GC SS_cons ..>>>\n\
            //\n\
            # STOCKHOLM 1.0\n\
            #=GF ID second\n\
            t1   ACGU\n\
            //\n";
        let families = parse(input, &IoContext::new_default());
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].aligned[0].1, "GGGAAACCC");
        assert_eq!(families[0].structures[0].to_bracket(), "(((...)))");
        assert_eq!(families[0].consensus.name(), "first");
        assert_eq!(families[1].consensus.to_bracket(), "....");
        assert_eq!(families[1].structures[0].rna.sequence(), "ACGU");
    }

    #[test]
    fn consensus_statistics_fill_population_spread() {
        let input = "\
            s1   GAAAC\n\
            s2   G---C\n\
            #=GC SS_cons <...>\n\
            //\n";
        let ctx = IoContext::new_default().with_consensus_statistics(true);
        let families = parse(input, &ctx);
        let consensus = &families[0].consensus;

        let helix = &consensus.helices()[0];
        assert_eq!(helix.spread, Some(0.0));
        let junction = &consensus.junctions()[0];
        // Junction 1-5 spans 5 residues in s1 and 2 in s2.
        let spread = junction.spread.expect("spread should be set");
        assert!((spread - 1.5).abs() < 1e-9);
    }

    #[test]
    fn row_length_mismatch_is_a_format_error() {
        let input = "s1   GGAAC\n#=GC SS_cons <<.>>>\n//\n";
        let err = read(Cursor::new(input), &IoContext::new_default()).expect_err("should fail");
        match err {
            Error::Format {
                format,
                line_number,
                ..
            } => {
                assert_eq!(format, "Stockholm");
                assert_eq!(line_number, 3);
            }
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn remap_block_searches_outward_from_both_boundaries() {
        let columns = vec![None, Some(1), None, Some(2), None];
        assert_eq!(remap_block(&Block::new(2, 4), &columns), Some(Block::new(1, 2)));
        assert_eq!(remap_block(&Block::new(3, 3), &columns), Some(Block::new(1, 2)));
        assert_eq!(remap_block(&Block::new(1, 2), &columns), None);
        assert_eq!(remap_block(&Block::new(4, 5), &columns), None);
    }

    #[test]
    fn fully_gapped_retained_block_widens_to_its_neighbours() {
        let input = "\
            s1   --AAGGAA--AACCA\n\
            s2   --AAGGAA--AACCA\n\
            s3   GGAA--AACCAA--A\n\
            #=GC SS_cons <<..[[..>>..]].\n\
            //\n";
        let families = parse(input, &IoContext::new_default());
        assert_eq!(
            families[0].consensus.retained_locations(),
            &[Location::from_positions([5, 6, 13, 14])]
        );

        let s3 = &families[0].structures[2];
        assert_eq!(s3.rna.sequence(), "GGAAAACCAAA");
        assert_eq!(
            s3.retained_locations(),
            &[Location::from_blocks([Block::new(4, 5), Block::new(10, 11)])]
        );
    }
}
