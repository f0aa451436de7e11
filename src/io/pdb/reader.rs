//! PDB reader that rebuilds nucleic-acid chains from fixed-column coordinate records.
//!
//! The parser streams the file once. A residue is confirmed as a nucleotide when its first
//! `O4'` (or legacy `O4*`) atom arrives and as an amino acid when a `CA` atom arrives
//! first; atoms seen before either discriminator wait in a small provisional buffer that
//! is flushed into the residue once it is confirmed. Protein residues are dropped, so
//! chains made only of them produce no output.

use crate::io::context::IoContext;
use crate::io::error::Error;
use crate::model::{
    atom::Atom,
    residue::Residue,
    rna::Rna,
    tertiary::{Metadata, TertiaryStructure},
    types::{Point, ResidueKind},
};
use log::{debug, info};
use std::io::BufRead;
use std::ops::Range;

const FORMAT: &str = "PDB";
/// Coordinate records must reach the end of the Z field.
const MIN_ATOM_RECORD_WIDTH: usize = 54;
const UNPUBLISHED: &str = "To be published";

/// Nucleotide/protein classification of the residue being streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResidueClass {
    Pending,
    Nucleotide,
    Protein,
}

/// Fields extracted from one `ATOM`/`HETATM` record.
struct AtomRecord<'a> {
    atom_name: &'a str,
    res_name: &'a str,
    chain_id: &'a str,
    label: &'a str,
    pos: Point,
}

/// Loop state of a single parse call.
struct ChainBuilder {
    finished: Vec<TertiaryStructure>,
    /// Nucleic structure of the open chain, created on its first confirmed nucleotide.
    current: Option<TertiaryStructure>,
    chain_id: Option<String>,
    /// Chain named by a `TER` record seen since the last atom record.
    terminated_chain: Option<String>,
    residue_key: Option<(String, String)>,
    residue_class: ResidueClass,
    /// Atoms of the current residue that arrived before its discriminator atom.
    provisional: Vec<Atom>,
    chain_has_protein: bool,
    nucleic_chains: usize,
    protein_chains: usize,
}

impl ChainBuilder {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: None,
            chain_id: None,
            terminated_chain: None,
            residue_key: None,
            residue_class: ResidueClass::Pending,
            provisional: Vec::new(),
            chain_has_protein: false,
            nucleic_chains: 0,
            protein_chains: 0,
        }
    }

    fn starts_new_chain(&self, chain_id: &str) -> bool {
        let label_changed = self.chain_id.as_deref() != Some(chain_id);
        let after_terminator = self
            .terminated_chain
            .as_deref()
            .is_some_and(|ter| ter != chain_id);
        label_changed || after_terminator
    }

    fn finish_chain(&mut self) {
        if let Some(mut structure) = self.current.take() {
            self.nucleic_chains += 1;
            if structure.chain_id.is_empty() {
                structure.rna.name = format!("chain {}", self.nucleic_chains);
            }
            debug!(
                "finished nucleic chain {} '{}' with {} residues",
                self.nucleic_chains,
                structure.chain_id,
                structure.residue_count()
            );
            self.finished.push(structure);
        } else if self.chain_has_protein {
            self.protein_chains += 1;
            debug!(
                "skipped protein chain {} '{}'",
                self.protein_chains,
                self.chain_id.as_deref().unwrap_or_default()
            );
        }
        self.chain_has_protein = false;
        self.reset_residue();
    }

    fn reset_residue(&mut self) {
        self.residue_key = None;
        self.residue_class = ResidueClass::Pending;
        self.provisional.clear();
    }

    fn accept(&mut self, record: AtomRecord<'_>) {
        if self.starts_new_chain(record.chain_id) {
            if self.chain_id.is_some() {
                self.finish_chain();
            }
            self.chain_id = Some(record.chain_id.to_string());
        }
        self.terminated_chain = None;

        let key = (record.label.to_string(), record.res_name.to_string());
        if self.residue_key.as_ref() != Some(&key) {
            self.reset_residue();
            self.residue_key = Some(key);
        }

        let atom = Atom::new(record.atom_name, record.pos);
        match self.residue_class {
            ResidueClass::Protein => {}
            ResidueClass::Nucleotide => {
                if let Some(residue) = self
                    .current
                    .as_mut()
                    .and_then(TertiaryStructure::last_residue_mut)
                {
                    residue.add_atom(atom);
                }
            }
            ResidueClass::Pending => match record.atom_name {
                "O4'" | "O4*" => self.confirm_nucleotide(&record, atom),
                "CA" => {
                    self.residue_class = ResidueClass::Protein;
                    self.chain_has_protein = true;
                    self.provisional.clear();
                }
                _ => match self.provisional.iter_mut().find(|a| a.name == atom.name) {
                    Some(existing) => *existing = atom,
                    None => self.provisional.push(atom),
                },
            },
        }
    }

    fn confirm_nucleotide(&mut self, record: &AtomRecord<'_>, discriminator: Atom) {
        let chain_id = record.chain_id;
        let structure = self
            .current
            .get_or_insert_with(|| TertiaryStructure::new(chain_id, Rna::new(chain_id, "")));

        let kind = ResidueKind::from_residue_name(record.res_name);
        structure.rna.push(kind.one_letter_code());
        let mut residue = Residue::new(kind, record.res_name, structure.rna.len(), record.label);
        for atom in self.provisional.drain(..) {
            residue.add_atom(atom);
        }
        residue.add_atom(discriminator);
        structure.add_residue(residue);

        self.residue_class = ResidueClass::Nucleotide;
    }

    fn finish(mut self, metadata: Metadata) -> Vec<TertiaryStructure> {
        self.finish_chain();
        info!(
            "parsed {} nucleic and {} protein chains",
            self.nucleic_chains, self.protein_chains
        );
        let mut structures = self.finished;
        for structure in structures.iter_mut() {
            structure.metadata = metadata.clone();
        }
        structures
    }
}

/// Accumulates title, author, and publication records across the whole file.
#[derive(Default)]
struct MetadataBuilder {
    title: String,
    first_author: Option<String>,
    pub_date: Option<String>,
}

impl MetadataBuilder {
    fn observe(&mut self, line: &str) {
        let body = line.get(10..).unwrap_or_default().trim();
        if line.starts_with("TITLE") {
            if !body.is_empty() {
                if !self.title.is_empty() {
                    self.title.push(' ');
                }
                self.title.push_str(body);
            }
        } else if line.starts_with("AUTHOR") {
            if self.first_author.is_none() {
                let first = body.split(',').next().unwrap_or_default().trim();
                if !first.is_empty() {
                    self.first_author = Some(first.to_string());
                }
            }
        } else if line.starts_with("JRNL")
            && field(line, 12..16).map(str::trim) == Some("REF")
            && self.pub_date.is_none()
        {
            if line.to_ascii_uppercase().contains("TO BE PUBLISHED") {
                self.pub_date = Some(UNPUBLISHED.to_string());
            } else if let Some(year) = field(line, 62..66).map(str::trim) {
                if !year.is_empty() {
                    self.pub_date = Some(year.to_string());
                }
            }
        }
    }

    fn build(self) -> Metadata {
        Metadata {
            title: (!self.title.is_empty()).then(|| sentence_case(&self.title)),
            authors: self.first_author,
            pub_date: self.pub_date,
        }
    }
}

/// Parses a PDB stream into one [`TertiaryStructure`] per nucleic-acid chain.
///
/// Chains are emitted in file order. Residues without an `O4'`/`O4*` atom, and any record
/// whose residue name is blank or listed in the context's ignore set, contribute nothing.
/// Only the first `MODEL` of a multi-model file is read.
///
/// # Errors
///
/// Returns [`Error::Format`] when a coordinate field is not numeric, and [`Error::Io`] when
/// the underlying reader fails. Records too short to hold coordinates are skipped.
///
/// # Examples
///
/// ```
/// use rna_forge::io::{read_pdb_structures, IoContext};
/// use std::io::Cursor;
///
/// let pdb = "\
/// ATOM      1  P     G A   1       0.000   0.000   0.000  1.00 20.00           P\n\
/// ATOM      2  O4'   G A   1       1.000   0.000   0.000  1.00 20.00           O\n\
/// END\n";
/// let structures = read_pdb_structures(Cursor::new(pdb), &IoContext::new_default()).unwrap();
/// assert_eq!(structures.len(), 1);
/// assert_eq!(structures[0].rna.sequence(), "G");
/// ```
pub fn read<R: BufRead>(reader: R, context: &IoContext) -> Result<Vec<TertiaryStructure>, Error> {
    let mut chains = ChainBuilder::new();
    let mut metadata = MetadataBuilder::default();

    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        let line = line.map_err(Error::from_io)?;

        if line.starts_with("ENDMDL") {
            debug!("stopping at the end of the first model (line {})", line_num);
            break;
        }

        if line.starts_with("TER") {
            let ter_chain = field(&line, 21..22)
                .map(|id| id.trim().to_string())
                .or_else(|| chains.chain_id.clone());
            chains.terminated_chain = ter_chain;
            continue;
        }

        if line.starts_with("ATOM  ") || line.starts_with("HETATM") {
            if let Some(record) = parse_atom_record(&line, line_num, context)? {
                chains.accept(record);
            }
            continue;
        }

        metadata.observe(&line);
    }

    Ok(chains.finish(metadata.build()))
}

/// Extracts an atom record, or `None` when the record is skippable.
fn parse_atom_record<'a>(
    line: &'a str,
    line_num: usize,
    context: &IoContext,
) -> Result<Option<AtomRecord<'a>>, Error> {
    if line.len() < MIN_ATOM_RECORD_WIDTH {
        debug!("skipping short coordinate record at line {}", line_num);
        return Ok(None);
    }

    let (Some(atom_field), Some(res_field), Some(chain_field), Some(label_field)) = (
        field(line, 12..16),
        field(line, 17..21),
        field(line, 21..22),
        field(line, 22..27),
    ) else {
        debug!("skipping unreadable coordinate record at line {}", line_num);
        return Ok(None);
    };

    let res_name = res_field.trim();
    let chain_id = chain_field.trim();
    if res_name.is_empty() || context.is_ignored(res_name) || context.is_chain_ignored(chain_id)
    {
        return Ok(None);
    }

    let x = parse_coordinate(line, 30..38, line_num, "X")?;
    let y = parse_coordinate(line, 38..46, line_num, "Y")?;
    let z = parse_coordinate(line, 46..54, line_num, "Z")?;

    Ok(Some(AtomRecord {
        atom_name: atom_field.trim(),
        res_name,
        chain_id,
        label: label_field.trim(),
        pos: Point::new(x, y, z),
    }))
}

fn parse_coordinate(
    line: &str,
    columns: Range<usize>,
    line_num: usize,
    axis: &str,
) -> Result<f64, Error> {
    field(line, columns)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| Error::format(FORMAT, line_num, format!("Invalid {} coordinate", axis)))
}

/// Column slice that tolerates short lines and non-ASCII content.
fn field(line: &str, columns: Range<usize>) -> Option<&str> {
    line.get(columns)
}

/// Lowercases a title and capitalizes its first letter.
fn sentence_case(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
