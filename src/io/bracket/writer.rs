use crate::io::error::Error;
use crate::model::secondary::SecondaryStructure;
use std::io::Write;

/// Writes each structure as a `>name`, sequence, notation triplet.
pub fn write<W: Write>(mut writer: W, structures: &[SecondaryStructure]) -> Result<(), Error> {
    for structure in structures {
        writeln!(writer, ">{}", structure.name()).map_err(Error::from_io)?;
        writeln!(writer, "{}", structure.rna.sequence()).map_err(Error::from_io)?;
        writeln!(writer, "{}", structure.to_bracket()).map_err(Error::from_io)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::bracket::reader;
    use crate::io::context::IoContext;
    use crate::model::rna::Rna;
    use std::io::Cursor;

    #[test]
    fn write_emits_three_lines_per_record() {
        let ss = SecondaryStructure::from_bracket(Rna::new("hp", "GGAAACC"), "((...))")
            .expect("valid notation");

        let mut buffer = Vec::new();
        write(&mut buffer, &[ss]).expect("writer should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert_eq!(output, ">hp\nGGAAACC\n((...))\n");
    }

    #[test]
    fn written_records_parse_back_unchanged() {
        let input = ">a\nGGGAAACCC\n(((...)))\n>b\nGGAAGGAACCAACCA\n((..[[..))..]].\n";
        let ctx = IoContext::new_default();
        let first = reader::read(Cursor::new(input), &ctx).expect("parse");

        let mut buffer = Vec::new();
        write(&mut buffer, &first).expect("write");
        let second = reader::read(Cursor::new(buffer), &ctx).expect("reparse");

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.name(), b.name());
            assert_eq!(a.rna.sequence(), b.rna.sequence());
            assert_eq!(a.to_bracket(), b.to_bracket());
        }
    }
}
