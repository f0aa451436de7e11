//! Bracket notation codec shared by every secondary-structure source.
//!
//! Pairs are grouped into layers by bracket type: `()` first, then `[]`, `{}`, `<>`, and
//! finally letter pairs `Aa` through `Zz`. Layer zero is the nested secondary layer when a
//! structure is rendered back to text.

use super::base_pair::BasePair;
use thiserror::Error;

const BRACKETS: [(char, char); 4] = [('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')];

/// Symbol used for unpaired positions.
pub const UNPAIRED: char = '.';

/// Errors raised while decoding bracket notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("unmatched opening bracket at position {0}")]
    UnmatchedOpen(usize),
    #[error("unmatched closing bracket at position {0}")]
    UnmatchedClose(usize),
    #[error("unknown notation symbol '{symbol}' at position {position}")]
    UnknownSymbol { position: usize, symbol: char },
    #[error("notation length {notation} does not match sequence length {sequence}")]
    LengthMismatch { sequence: usize, notation: usize },
}

/// Number of distinct pair layers the notation can express.
pub fn layer_count() -> usize {
    BRACKETS.len() + 26
}

/// Opening and closing symbols for a layer.
pub fn layer_symbols(layer: usize) -> Option<(char, char)> {
    if layer < BRACKETS.len() {
        return Some(BRACKETS[layer]);
    }
    let offset = layer - BRACKETS.len();
    if offset < 26 {
        let upper = (b'A' + offset as u8) as char;
        Some((upper, upper.to_ascii_lowercase()))
    } else {
        None
    }
}

/// Classifies a symbol as `(layer, is_opening)`.
fn classify_symbol(symbol: char) -> Option<(usize, bool)> {
    if let Some(layer) = BRACKETS.iter().position(|(open, _)| *open == symbol) {
        return Some((layer, true));
    }
    if let Some(layer) = BRACKETS.iter().position(|(_, close)| *close == symbol) {
        return Some((layer, false));
    }
    if symbol.is_ascii_uppercase() {
        return Some((BRACKETS.len() + (symbol as u8 - b'A') as usize, true));
    }
    if symbol.is_ascii_lowercase() {
        return Some((BRACKETS.len() + (symbol as u8 - b'a') as usize, false));
    }
    None
}

/// Whether `symbol` belongs to the bracket alphabet (unpaired dot or a bracket, no letters).
pub fn is_bracket_symbol(symbol: char) -> bool {
    symbol == UNPAIRED
        || BRACKETS
            .iter()
            .any(|(open, close)| *open == symbol || *close == symbol)
}

/// Decodes notation into base pairs tagged with their layer, in closing order.
///
/// Positions in the returned pairs are 1-based.
pub fn parse(notation: &str) -> Result<Vec<(BasePair, usize)>, NotationError> {
    let mut stacks: Vec<Vec<usize>> = vec![Vec::new(); layer_count()];
    let mut pairs = Vec::new();

    for (index, symbol) in notation.chars().enumerate() {
        let position = index + 1;
        if symbol == UNPAIRED {
            continue;
        }
        let (layer, opening) = classify_symbol(symbol)
            .ok_or(NotationError::UnknownSymbol { position, symbol })?;
        if opening {
            stacks[layer].push(position);
        } else {
            let start = stacks[layer]
                .pop()
                .ok_or(NotationError::UnmatchedClose(position))?;
            pairs.push((BasePair::new(start, position), layer));
        }
    }

    if let Some(position) = stacks.iter().filter_map(|s| s.first()).min() {
        return Err(NotationError::UnmatchedOpen(*position));
    }

    Ok(pairs)
}

/// Renders nested pairs with `()` and each tertiary layer with the next bracket type.
///
/// Tertiary pairs are placed greedily into the first layer they do not cross. Pairs that
/// touch an already written position, fall outside `length`, or exceed the available
/// layers are left out.
pub fn render(length: usize, secondaries: &[BasePair], tertiaries: &[BasePair]) -> String {
    let mut symbols = vec![UNPAIRED; length];
    let in_range = |pair: &BasePair| pair.start() >= 1 && pair.end() <= length;

    for pair in secondaries.iter().filter(|p| in_range(p)) {
        symbols[pair.start() - 1] = '(';
        symbols[pair.end() - 1] = ')';
    }

    let mut layers: Vec<Vec<BasePair>> = Vec::new();
    for pair in tertiaries.iter().filter(|p| in_range(p)) {
        if symbols[pair.start() - 1] != UNPAIRED || symbols[pair.end() - 1] != UNPAIRED {
            continue;
        }
        let slot = layers
            .iter()
            .position(|layer| layer.iter().all(|other| !other.crosses(pair)));
        let layer = match slot {
            Some(layer) => layer,
            None => {
                layers.push(Vec::new());
                layers.len() - 1
            }
        };
        let Some((open, close)) = layer_symbols(layer + 1) else {
            continue;
        };
        layers[layer].push(*pair);
        symbols[pair.start() - 1] = open;
        symbols[pair.end() - 1] = close;
    }

    symbols.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pairs_every_bracket_layer() {
        let pairs = parse("((..[[..))..]]Aa").unwrap();
        let mut flat: Vec<_> = pairs
            .iter()
            .map(|(p, layer)| (p.start(), p.end(), *layer))
            .collect();
        flat.sort();
        assert_eq!(
            flat,
            vec![
                (1, 10, 0),
                (2, 9, 0),
                (5, 14, 1),
                (6, 13, 1),
                (15, 16, 4)
            ]
        );
    }

    #[test]
    fn parse_reports_unbalanced_and_unknown_symbols() {
        assert_eq!(parse("((.)"), Err(NotationError::UnmatchedOpen(1)));
        assert_eq!(parse("(.))"), Err(NotationError::UnmatchedClose(4)));
        assert_eq!(
            parse("(.#)"),
            Err(NotationError::UnknownSymbol {
                position: 3,
                symbol: '#'
            })
        );
    }

    #[test]
    fn render_places_crossing_pairs_in_successive_layers() {
        let secondaries = [BasePair::new(1, 10), BasePair::new(2, 9)];
        let tertiaries = [
            BasePair::new(5, 14),
            BasePair::new(6, 13),
            BasePair::new(12, 16),
        ];
        assert_eq!(
            render(16, &secondaries, &tertiaries),
            "((..[[..)).{]].}"
        );
    }

    #[test]
    fn layer_symbols_run_out_after_letters() {
        assert_eq!(layer_symbols(0), Some(('(', ')')));
        assert_eq!(layer_symbols(4), Some(('A', 'a')));
        assert_eq!(layer_symbols(layer_count() - 1), Some(('Z', 'z')));
        assert_eq!(layer_symbols(layer_count()), None);
    }

    #[test]
    fn bracket_alphabet_excludes_letters() {
        assert!(is_bracket_symbol('.'));
        assert!(is_bracket_symbol('>'));
        assert!(!is_bracket_symbol('A'));
    }
}
