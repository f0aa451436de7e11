//! RNAML reader.
//!
//! Elements are located by tag scanning rather than a full XML parser. Declarations,
//! document types and comments are never interpreted, so no external grammar is loaded.
//! The reader understands the subset of the schema that carries sequences and pairs:
//!
//! ```text
//! <molecule id="...">
//!   <identity><name>...</name></identity>
//!   <sequence><seq-data>...</seq-data></sequence>
//!   <base-pair>
//!     <base-id-5p><base-id><position>N</position></base-id></base-id-5p>
//!     <base-id-3p><base-id><position>M</position></base-id></base-id-3p>
//!     <edge-5p>W</edge-5p> <edge-3p>W</edge-3p> <bond-orientation>c</bond-orientation>
//!   </base-pair>
//! </molecule>
//! ```

use crate::io::error::Error;
use crate::model::base_pair::BasePair;
use crate::model::rna::Rna;
use crate::model::secondary::SecondaryStructure;
use crate::model::types::{Edge, Orientation};
use log::{info, warn};
use std::io::BufRead;

const FORMAT: &str = "RNAML";

/// Located element: its attribute text, inner content and byte offset in the document.
#[derive(Debug, Clone, Copy)]
struct Element<'a> {
    attributes: &'a str,
    content: &'a str,
    offset: usize,
}

impl<'a> Element<'a> {
    fn attribute(&self, name: &str) -> Option<&'a str> {
        let mut rest = self.attributes;
        while let Some(eq) = rest.find('=') {
            let key = rest[..eq].trim();
            let value_part = rest[eq + 1..].trim_start();
            let quote = value_part.chars().next()?;
            if quote != '"' && quote != '\'' {
                return None;
            }
            let close = value_part[1..].find(quote)?;
            if key == name {
                return Some(&value_part[1..1 + close]);
            }
            rest = &value_part[close + 2..];
        }
        None
    }
}

/// Whether the character after `<tag` ends the tag name.
fn ends_tag_name(next: Option<char>) -> bool {
    matches!(next, Some('>') | Some('/')) || next.is_some_and(char::is_whitespace)
}

/// Finds every `<tag ...>...</tag>` (or `<tag/>`) element in `xml`, starting at `base`.
fn elements<'a>(xml: &'a str, tag: &str, base: usize) -> Vec<Element<'a>> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut found = Vec::new();
    let mut search_from = 0;

    while let Some(pos) = xml[search_from..].find(&open) {
        let start = search_from + pos;
        let after_name = start + open.len();
        if !ends_tag_name(xml[after_name..].chars().next()) {
            search_from = after_name;
            continue;
        }
        let Some(tag_end) = xml[after_name..].find('>').map(|p| after_name + p) else {
            break;
        };

        let head = &xml[after_name..tag_end];
        if let Some(attributes) = head.strip_suffix('/') {
            found.push(Element {
                attributes,
                content: "",
                offset: base + start,
            });
            search_from = tag_end + 1;
            continue;
        }

        let content_start = tag_end + 1;
        let Some(content_end) = xml[content_start..].find(&close).map(|p| content_start + p)
        else {
            break;
        };
        found.push(Element {
            attributes: head,
            content: &xml[content_start..content_end],
            offset: base + content_start,
        });
        search_from = content_end + close.len();
    }

    found
}

fn first_element<'a>(parent: &Element<'a>, tag: &str) -> Option<Element<'a>> {
    elements(parent.content, tag, parent.offset).into_iter().next()
}

fn element_text<'a>(parent: &Element<'a>, tag: &str) -> Option<&'a str> {
    first_element(parent, tag).map(|e| e.content.trim())
}

/// Removes `<!-- ... -->` comments, keeping newlines so offsets map to the same lines.
fn strip_comments(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find("-->") else {
            rest = "";
            break;
        };
        let comment = &rest[start..start + end + 3];
        out.extend(comment.chars().filter(|c| *c == '\n'));
        rest = &rest[start + end + 3..];
    }
    out.push_str(rest);
    out
}

fn line_of(xml: &str, offset: usize) -> usize {
    xml[..offset.min(xml.len())].matches('\n').count() + 1
}

/// Reads every `<molecule>` of an RNAML document.
///
/// # Errors
///
/// Returns [`Error::MissingElement`] when a molecule lacks `<seq-data>` or a pair lacks a
/// `<position>`, [`Error::Format`] when a position is not a number, and [`Error::Io`] when
/// the reader fails.
///
/// # Examples
///
/// ```
/// use rna_forge::io::read_rnaml;
/// use std::io::Cursor;
///
/// let xml = r#"<rnaml><molecule id="m1">
///   <sequence><seq-data>gg aa cc</seq-data></sequence>
///   <base-pair>
///     <base-id-5p><base-id><position>1</position></base-id></base-id-5p>
///     <base-id-3p><base-id><position>6</position></base-id></base-id-3p>
///   </base-pair>
/// </molecule></rnaml>"#;
/// let structures = read_rnaml(Cursor::new(xml)).unwrap();
/// assert_eq!(structures[0].rna.sequence(), "GGAACC");
/// assert_eq!(structures[0].to_bracket(), "(....)");
/// ```
pub fn read<R: BufRead>(mut reader: R) -> Result<Vec<SecondaryStructure>, Error> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw).map_err(Error::from_io)?;
    let xml = strip_comments(&raw);

    let mut structures = Vec::new();
    for (index, molecule) in elements(&xml, "molecule", 0).into_iter().enumerate() {
        structures.push(read_molecule(&xml, &molecule, index)?);
    }

    info!("parsed {} RNAML molecules", structures.len());
    Ok(structures)
}

fn read_molecule(
    xml: &str,
    molecule: &Element<'_>,
    index: usize,
) -> Result<SecondaryStructure, Error> {
    let name = first_element(molecule, "identity")
        .and_then(|identity| element_text(&identity, "name"))
        .map(str::to_string)
        .or_else(|| molecule.attribute("id").map(str::to_string))
        .unwrap_or_else(|| format!("molecule {}", index + 1));

    let seq_data = element_text(molecule, "seq-data")
        .ok_or_else(|| Error::missing_element(FORMAT, "seq-data"))?;
    let sequence: String = seq_data
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let mut pairs = Vec::new();
    for element in elements(molecule.content, "base-pair", molecule.offset) {
        let five = pair_position(xml, &element, "base-id-5p")?;
        let three = pair_position(xml, &element, "base-id-3p")?;

        if five == 0 || three == 0 || five.max(three) > sequence.len() || five == three {
            warn!(
                "dropping RNAML pair {}-{} outside molecule '{}' (line {})",
                five,
                three,
                name,
                line_of(xml, element.offset)
            );
            continue;
        }

        let edge5 = element_text(&element, "edge-5p")
            .map(Edge::from_code)
            .unwrap_or_default();
        let edge3 = element_text(&element, "edge-3p")
            .map(Edge::from_code)
            .unwrap_or_default();
        let orientation = element_text(&element, "bond-orientation")
            .map(Orientation::from_code)
            .unwrap_or_default();

        pairs.push(BasePair::with_geometry(five, three, edge5, edge3, orientation));
    }

    Ok(SecondaryStructure::from_base_pairs(
        Rna::new(&name, &sequence),
        pairs,
    ))
}

/// Position of one partner: `<side><base-id><position>`, tolerating a missing `<base-id>`.
fn pair_position(xml: &str, pair: &Element<'_>, side: &str) -> Result<usize, Error> {
    let side_element =
        first_element(pair, side).ok_or_else(|| Error::missing_element(FORMAT, side))?;
    let holder = first_element(&side_element, "base-id").unwrap_or(side_element);
    let position = first_element(&holder, "position")
        .ok_or_else(|| Error::missing_element(FORMAT, "position"))?;

    position.content.trim().parse::<usize>().map_err(|_| {
        Error::format(
            FORMAT,
            line_of(xml, position.offset),
            format!("Invalid position '{}'", position.content.trim()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RNAML_DATA: &str = r#"<?xml version="1.0"?>
<!DOCTYPE rnaml SYSTEM "rnaml.dtd">
<rnaml version="1.1">
  <!-- <molecule id="commented"><seq-data>AAAA</seq-data></molecule> -->
  <molecule id="1" type="rna">
    <identity><name>toy hairpin</name></identity>
    <sequence length="8">
      <seq-data>
        ggga aucc
      </seq-data>
    </sequence>
    <structure><model id="m1"><str-annotation>
      <base-pair>
        <base-id-5p><base-id><position>1</position></base-id></base-id-5p>
        <base-id-3p><base-id><position>8</position></base-id></base-id-3p>
        <edge-5p>W</edge-5p><edge-3p>W</edge-3p>
        <bond-orientation>c</bond-orientation>
      </base-pair>
      <base-pair>
        <base-id-5p><base-id><position>2</position></base-id></base-id-5p>
        <base-id-3p><base-id><position>7</position></base-id></base-id-3p>
        <edge-5p>s</edge-5p><edge-3p>H</edge-3p>
        <bond-orientation>T</bond-orientation>
      </base-pair>
    </str-annotation></model></structure>
  </molecule>
  <molecule id="second">
    <sequence><seq-data>AC</seq-data></sequence>
  </molecule>
</rnaml>
"#;

    #[test]
    fn read_extracts_molecules_sequences_and_pairs() {
        let structures = read(Cursor::new(RNAML_DATA)).expect("parse");
        assert_eq!(structures.len(), 2);

        let hairpin = &structures[0];
        assert_eq!(hairpin.name(), "toy hairpin");
        assert_eq!(hairpin.rna.sequence(), "GGGAAUCC");
        assert_eq!(hairpin.to_bracket(), "((....))");

        let inner = hairpin.secondaries()[1];
        assert_eq!((inner.start(), inner.end()), (2, 7));
        assert_eq!(inner.edge5, Edge::Sugar);
        assert_eq!(inner.edge3, Edge::Hoogsteen);
        assert_eq!(inner.orientation, Orientation::Trans);

        let outer = hairpin.secondaries()[0];
        assert_eq!(outer.edge5, Edge::WatsonCrick);
        assert_eq!(outer.orientation, Orientation::Cis);

        assert_eq!(structures[1].name(), "second");
        assert!(structures[1].secondaries().is_empty());
    }

    #[test]
    fn missing_position_is_reported() {
        let xml = r#"<molecule><sequence><seq-data>GC</seq-data></sequence>
            <base-pair>
              <base-id-5p><base-id></base-id></base-id-5p>
              <base-id-3p><base-id><position>2</position></base-id></base-id-3p>
            </base-pair></molecule>"#;

        let err = read(Cursor::new(xml)).expect_err("should fail");
        match err {
            Error::MissingElement { format, element } => {
                assert_eq!(format, "RNAML");
                assert_eq!(element, "position");
            }
            other => panic!("expected MissingElement, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_position_is_a_format_error() {
        let xml = "<molecule><sequence><seq-data>GC</seq-data></sequence>\n<base-pair>\n\
            <base-id-5p><position>one</position></base-id-5p>\n\
            <base-id-3p><position>2</position></base-id-3p>\n</base-pair></molecule>";

        let err = read(Cursor::new(xml)).expect_err("should fail");
        match err {
            Error::Format { line_number, .. } => assert_eq!(line_number, 3),
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn tag_names_match_exactly() {
        let doc = "<base-id-5p><base-id><position>3</position></base-id></base-id-5p>";
        let found = elements(doc, "base-id", 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "<position>3</position>");
    }

    #[test]
    fn attributes_are_read_from_open_tags() {
        let found = elements(r#"<molecule id="m7" type='rna'>x</molecule>"#, "molecule", 0);
        assert_eq!(found[0].attribute("id"), Some("m7"));
        assert_eq!(found[0].attribute("type"), Some("rna"));
        assert_eq!(found[0].attribute("missing"), None);
    }
}
