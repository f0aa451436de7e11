//! Secondary structure: an RNA plus its base pairs, split into nested and tertiary layers.
//!
//! Base pairs are classified once, at construction, by a deterministic greedy pass: pairs
//! lying inside a retained pseudoknot location are considered first, then pairs from lower
//! notation layers, then pairs in 5′ order. A pair joins the nested (secondary) layer when
//! neither endpoint is already paired there and it crosses no accepted pair; everything
//! else is tertiary. Helices, junctions and pseudoknots are derived from that split on
//! first request and memoized for the lifetime of the instance.

use super::base_pair::BasePair;
use super::location::{Block, Location};
use super::notation::{self, NotationError};
use super::rna::Rna;
use super::tertiary::TertiaryStructure;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

const CANONICAL_PAIRS: [(char, char); 6] = [
    ('A', 'U'),
    ('U', 'A'),
    ('G', 'C'),
    ('C', 'G'),
    ('G', 'U'),
    ('U', 'G'),
];

/// Maximal run of stacked nested pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Helix {
    /// Pairs from the outermost to the innermost.
    pub pairs: Vec<BasePair>,
    /// Both strands of the helix.
    pub location: Location,
    /// Standard deviation of the residue count spanned by this helix across an alignment.
    pub spread: Option<f64>,
}

impl Helix {
    fn from_pairs(pairs: Vec<BasePair>) -> Self {
        let location =
            Location::from_positions(pairs.iter().flat_map(|p| [p.start(), p.end()]));
        Self {
            pairs,
            location,
            spread: None,
        }
    }

    /// Number of stacked pairs.
    pub fn length(&self) -> usize {
        self.pairs.len()
    }

    /// Innermost pair, which closes the loop enclosed by the helix.
    pub fn closing_pair(&self) -> Option<&BasePair> {
        self.pairs.last()
    }
}

/// Loop topology by the number of helices bounding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JunctionKind {
    /// Hairpin loop closed by a single helix.
    Apical,
    /// Internal loop or bulge between two helices.
    Inner,
    /// Multi-branch loop with the given number of helices.
    MultiBranch(usize),
}

impl JunctionKind {
    fn from_helix_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::Apical,
            2 => Self::Inner,
            n => Self::MultiBranch(n),
        }
    }
}

impl fmt::Display for JunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apical => write!(f, "Apical"),
            Self::Inner => write!(f, "Inner"),
            Self::MultiBranch(n) => write!(f, "{}-way", n),
        }
    }
}

/// Loop region enclosed by a helix' closing pair.
///
/// The location includes the paired positions bounding the loop, so an apical loop closed
/// by `(a, b)` spans the single block `a..=b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub location: Location,
    pub kind: JunctionKind,
    /// Number of helices bounding the loop, the enclosing one included.
    pub helix_count: usize,
    /// Standard deviation of the residue count spanned by this junction across an alignment.
    pub spread: Option<f64>,
}

/// Helix together with the tertiary pairs crossing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pseudoknot {
    pub helix: Helix,
    pub tertiaries: Vec<BasePair>,
}

impl Pseudoknot {
    /// Union of every position touched by the crossing pairs.
    pub fn tertiary_location(&self) -> Location {
        Location::from_positions(self.tertiaries.iter().flat_map(|p| [p.start(), p.end()]))
    }
}

/// RNA with classified base pairs and lazily derived groupings.
#[derive(Debug, Clone)]
pub struct SecondaryStructure {
    pub rna: Rna,
    secondaries: Vec<BasePair>,
    tertiaries: Vec<BasePair>,
    retained: Vec<Location>,
    /// Coordinate structure this one was derived from, if any.
    pub source: Option<Arc<TertiaryStructure>>,
    helices: OnceLock<Vec<Helix>>,
    junctions: OnceLock<Vec<Junction>>,
    pseudoknots: OnceLock<Vec<Pseudoknot>>,
}

impl SecondaryStructure {
    /// Builds a structure from bracket notation.
    ///
    /// # Errors
    ///
    /// Returns [`NotationError`] when the notation is unbalanced, contains an unknown symbol,
    /// or differs in length from the sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use rna_forge::{Rna, SecondaryStructure};
    ///
    /// let ss = SecondaryStructure::from_bracket(Rna::new("hp", "GGGAAACCC"), "(((...)))").unwrap();
    /// assert_eq!(ss.helices().len(), 1);
    /// assert_eq!(ss.to_bracket(), "(((...)))");
    /// ```
    pub fn from_bracket(rna: Rna, notation: &str) -> Result<Self, NotationError> {
        Self::from_bracket_with_retained(rna, notation, Vec::new())
    }

    /// Builds a structure from bracket notation, preferring pairs inside `retained`
    /// locations when deciding which pairs form the nested layer.
    pub fn from_bracket_with_retained(
        rna: Rna,
        notation: &str,
        retained: Vec<Location>,
    ) -> Result<Self, NotationError> {
        let notation_length = notation.chars().count();
        if notation_length != rna.len() {
            return Err(NotationError::LengthMismatch {
                sequence: rna.len(),
                notation: notation_length,
            });
        }
        let candidates = notation::parse(notation)?;
        Ok(Self::assemble(rna, candidates, retained))
    }

    /// Builds a structure from an unlayered list of pairs.
    pub fn from_base_pairs(rna: Rna, pairs: impl IntoIterator<Item = BasePair>) -> Self {
        let mut seen = HashSet::new();
        let candidates = pairs
            .into_iter()
            .filter(|p| seen.insert((p.start(), p.end())))
            .map(|p| (p, 0))
            .collect();
        Self::assemble(rna, candidates, Vec::new())
    }

    fn assemble(rna: Rna, candidates: Vec<(BasePair, usize)>, retained: Vec<Location>) -> Self {
        let (secondaries, tertiaries) = classify(candidates, &retained);
        Self {
            rna,
            secondaries,
            tertiaries,
            retained,
            source: None,
            helices: OnceLock::new(),
            junctions: OnceLock::new(),
            pseudoknots: OnceLock::new(),
        }
    }

    /// Attaches the coordinate structure this one was derived from.
    pub fn with_source(mut self, source: Arc<TertiaryStructure>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn name(&self) -> &str {
        &self.rna.name
    }

    pub fn length(&self) -> usize {
        self.rna.len()
    }

    /// Nested pairs, sorted by 5′ position.
    pub fn secondaries(&self) -> &[BasePair] {
        &self.secondaries
    }

    /// Non-nested pairs, sorted by 5′ position.
    pub fn tertiaries(&self) -> &[BasePair] {
        &self.tertiaries
    }

    /// All pairs, nested first.
    pub fn base_pairs(&self) -> impl Iterator<Item = &BasePair> {
        self.secondaries.iter().chain(self.tertiaries.iter())
    }

    /// Pseudoknot locations that were preferred when building the nested layer.
    pub fn retained_locations(&self) -> &[Location] {
        &self.retained
    }

    /// Partner of a position in the nested layer.
    pub fn secondary_partner(&self, position: usize) -> Option<usize> {
        self.secondaries
            .iter()
            .find_map(|p| p.partner_of(position))
    }

    /// Bracket notation of the structure.
    pub fn to_bracket(&self) -> String {
        notation::render(self.length(), &self.secondaries, &self.tertiaries)
    }

    /// Maximal stacked runs of nested pairs, ordered by 5′ position.
    pub fn helices(&self) -> &[Helix] {
        self.helices
            .get_or_init(|| compute_helices(&self.secondaries))
    }

    /// Loops enclosed by each helix, in helix order.
    pub fn junctions(&self) -> &[Junction] {
        self.junctions
            .get_or_init(|| compute_junctions(&self.secondaries, self.helices()))
    }

    /// Helices crossed by at least one tertiary pair.
    pub fn pseudoknots(&self) -> &[Pseudoknot] {
        self.pseudoknots.get_or_init(|| {
            self.helices()
                .iter()
                .filter_map(|helix| {
                    let crossing: Vec<BasePair> = self
                        .tertiaries
                        .iter()
                        .filter(|t| helix.pairs.iter().any(|p| p.crosses(t)))
                        .copied()
                        .collect();
                    (!crossing.is_empty()).then(|| Pseudoknot {
                        helix: helix.clone(),
                        tertiaries: crossing,
                    })
                })
                .collect()
        })
    }

    /// Fills the statistical spread of every helix and junction.
    ///
    /// `spread` receives each grouping's location and returns its value.
    pub fn annotate_spreads(&mut self, mut spread: impl FnMut(&Location) -> f64) {
        self.junctions();
        if let Some(helices) = self.helices.get_mut() {
            for helix in helices.iter_mut() {
                helix.spread = Some(spread(&helix.location));
            }
        }
        if let Some(junctions) = self.junctions.get_mut() {
            for junction in junctions.iter_mut() {
                junction.spread = Some(spread(&junction.location));
            }
        }
    }

    /// Rewrites paired positions of the sequence with random canonical combinations.
    ///
    /// Used when a structure arrives without a sequence: the random bases are made
    /// consistent with the pairs so the result reads as a plausible molecule.
    pub fn resample_paired_bases(&mut self, rng: &mut impl Rng) {
        let mut touched = HashSet::new();
        let length = self.rna.len();
        let pairs: Vec<BasePair> = self.base_pairs().copied().collect();
        for pair in pairs {
            if pair.end() > length
                || touched.contains(&pair.start())
                || touched.contains(&pair.end())
            {
                continue;
            }
            let (five, three) = CANONICAL_PAIRS[rng.random_range(0..CANONICAL_PAIRS.len())];
            self.rna.set_residue(pair.start(), five);
            self.rna.set_residue(pair.end(), three);
            touched.insert(pair.start());
            touched.insert(pair.end());
        }
    }
}

impl fmt::Display for SecondaryStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SecondaryStructure {{ name: \"{}\", length: {}, secondaries: {}, tertiaries: {} }}",
            self.name(),
            self.length(),
            self.secondaries.len(),
            self.tertiaries.len()
        )
    }
}

fn classify(
    mut candidates: Vec<(BasePair, usize)>,
    retained: &[Location],
) -> (Vec<BasePair>, Vec<BasePair>) {
    let is_retained = |pair: &BasePair| {
        retained
            .iter()
            .any(|l| l.contains(pair.start()) && l.contains(pair.end()))
    };
    candidates.sort_by_key(|(pair, layer)| (!is_retained(pair), *layer, pair.start(), pair.end()));

    let mut used = HashSet::new();
    let mut secondaries: Vec<BasePair> = Vec::new();
    let mut tertiaries = Vec::new();

    for (pair, _) in candidates {
        let free = !used.contains(&pair.start()) && !used.contains(&pair.end());
        if free && secondaries.iter().all(|s| !s.crosses(&pair)) {
            used.insert(pair.start());
            used.insert(pair.end());
            secondaries.push(pair);
        } else {
            tertiaries.push(pair);
        }
    }

    secondaries.sort_by_key(|p| (p.start(), p.end()));
    tertiaries.sort_by_key(|p| (p.start(), p.end()));
    (secondaries, tertiaries)
}

fn compute_helices(secondaries: &[BasePair]) -> Vec<Helix> {
    let by_start: HashMap<usize, BasePair> =
        secondaries.iter().map(|p| (p.start(), *p)).collect();
    let mut visited = HashSet::new();
    let mut helices = Vec::new();

    for pair in secondaries {
        if visited.contains(&pair.start()) {
            continue;
        }
        let mut run = vec![*pair];
        visited.insert(pair.start());
        let mut current = *pair;
        while let Some(next) = by_start.get(&(current.start() + 1)) {
            if !current.stacks_on(next) {
                break;
            }
            run.push(*next);
            visited.insert(next.start());
            current = *next;
        }
        helices.push(Helix::from_pairs(run));
    }

    helices
}

fn compute_junctions(secondaries: &[BasePair], helices: &[Helix]) -> Vec<Junction> {
    let partners: HashMap<usize, usize> = secondaries
        .iter()
        .flat_map(|p| [(p.start(), p.end()), (p.end(), p.start())])
        .collect();

    helices
        .iter()
        .filter_map(Helix::closing_pair)
        .map(|closing| {
            let mut blocks = Vec::new();
            let mut helix_count = 1;
            let mut block_start = closing.start();
            let mut k = closing.start() + 1;
            while k < closing.end() {
                match partners.get(&k) {
                    Some(&partner) if partner > k && partner < closing.end() => {
                        blocks.push(Block::new(block_start, k));
                        helix_count += 1;
                        block_start = partner;
                        k = partner + 1;
                    }
                    _ => k += 1,
                }
            }
            blocks.push(Block::new(block_start, closing.end()));

            Junction {
                location: Location::from_blocks(blocks),
                kind: JunctionKind::from_helix_count(helix_count),
                helix_count,
                spread: None,
            }
        })
        .collect()
}
