mod bracket;
mod context;
mod ct;
mod error;
mod pdb;
mod rnaml;
mod stockholm;

pub use pdb::reader::read as read_pdb_structures;
pub use pdb::writer::write_structures as write_pdb_structures;

pub use bracket::reader::read as read_bracket;
pub use bracket::writer::write as write_bracket;

pub use ct::reader::{Dialect as CtDialect, read as read_connectivity_table, read_bpseq, read_ct};

pub use rnaml::reader::read as read_rnaml;

pub use stockholm::reader::{Alignment, read as read_stockholm};

pub use context::IoContext;

pub use error::Error;
