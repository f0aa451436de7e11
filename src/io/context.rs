//! Reader configuration shared across formats.
//!
//! `IoContext` plays the role of a small configuration layer: coordinate parsing consults
//! its residue and chain ignore sets, alignment parsing its gap alphabet and statistics switch, and the
//! dot-bracket reader its RNG seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct IoContext {
    ignored: HashSet<String>,
    ignored_chains: HashSet<String>,
    gaps: HashSet<char>,
    consensus_statistics: bool,
    rng_seed: Option<u64>,
}

impl Default for IoContext {
    fn default() -> Self {
        Self::new_default()
    }
}

impl IoContext {
    /// Builds the default context: common solvent, ion and cryo-additive residue names are
    /// ignored, no chain label is ignored, `-`, `.`, `_` and `~` count as alignment gaps, consensus statistics are
    /// off, and sequences generated for sequence-less records are unseeded.
    pub fn new_default() -> Self {
        let mut ignored = HashSet::new();

        macro_rules! register_ignored {
            ($($name:expr),* $(,)?) => {
                $(ignored.insert($name.to_string());)*
            };
        }

        // Solvent.
        register_ignored!("HOH", "WAT", "H2O", "DOD", "SOL", "TIP", "TIP3");
        // Ions.
        register_ignored!(
            "MG", "NA", "K", "CL", "CA", "ZN", "MN", "CO", "NI", "CD", "SR", "BA", "CS", "TL",
            "PB", "HG", "IR", "OS", "RB", "LI", "BR", "IOD", "FE", "FE2", "CU", "AU", "NH4",
            "NCO", "3CO",
        );
        // Buffers and cryo-protectants.
        register_ignored!(
            "SO4", "PO4", "GOL", "EDO", "PEG", "PGE", "MPD", "ACT", "ACY", "FMT", "EPE", "MES",
            "TRS", "SPM", "SPD", "IPA", "DMS", "BME", "CAC", "ACE",
        );

        let gaps = ['-', '.', '_', '~'].into_iter().collect();

        Self {
            ignored,
            ignored_chains: HashSet::new(),
            gaps,
            consensus_statistics: false,
            rng_seed: None,
        }
    }

    /// Adds residue names to the ignore set.
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored.extend(names.into_iter().map(normalize));
        self
    }

    /// Adds chain labels whose records are skipped entirely.
    pub fn with_ignored_chains<I, S>(mut self, chains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_chains.extend(chains.into_iter().map(normalize));
        self
    }

    /// Enables or disables per-helix and per-junction spread statistics on alignments.
    pub fn with_consensus_statistics(mut self, enabled: bool) -> Self {
        self.consensus_statistics = enabled;
        self
    }

    /// Fixes the seed used to generate sequences for sequence-less records.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Whether a residue name should be skipped entirely.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(&normalize(name))
    }

    pub fn is_chain_ignored(&self, chain_id: &str) -> bool {
        self.ignored_chains.contains(&normalize(chain_id))
    }

    pub fn is_gap(&self, symbol: char) -> bool {
        self.gaps.contains(&symbol)
    }

    pub fn consensus_statistics(&self) -> bool {
        self.consensus_statistics
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

fn normalize(name: impl AsRef<str>) -> String {
    name.as_ref().trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn default_context_ignores_solvent_and_ions() {
        let ctx = IoContext::new_default();
        assert!(ctx.is_ignored("HOH"));
        assert!(ctx.is_ignored(" MG"));
        assert!(!ctx.is_ignored("A"));
        assert!(!ctx.consensus_statistics());
    }

    #[test]
    fn with_ignored_normalizes_names() {
        let ctx = IoContext::new_default().with_ignored([" lig "]);
        assert!(ctx.is_ignored("LIG"));
    }

    #[test]
    fn chain_labels_are_ignored_only_when_registered() {
        let ctx = IoContext::new_default();
        assert!(ctx.is_ignored("K"));
        assert!(!ctx.is_chain_ignored("K"));

        let ctx = ctx.with_ignored_chains(["w"]);
        assert!(ctx.is_chain_ignored("W"));
        assert!(!ctx.is_chain_ignored("A"));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let ctx = IoContext::new_default().with_rng_seed(42);
        let a: u64 = ctx.rng().random();
        let b: u64 = ctx.rng().random();
        assert_eq!(a, b);
    }

    #[test]
    fn gap_alphabet_covers_alignment_symbols() {
        let ctx = IoContext::new_default();
        assert!(ctx.is_gap('-'));
        assert!(ctx.is_gap('.'));
        assert!(!ctx.is_gap('A'));
    }
}
