pub mod reader;
pub mod writer;
pub mod types;
pub mod collections;
pub mod pixmap;
pub mod version;
pub mod records;
pub mod encode;
pub mod assembler;
pub mod legacy;
pub mod input;

pub use reader::ByteCursor;
pub use writer::BinaryWriter;
pub use types::{Bounds3D, Color, Font, Point2D, Vector3D};
pub use version::{field_encoding, has_field, Encoding, FieldId};
pub use records::RecordDecoder;
pub use encode::RecordEncoder;
pub use assembler::{parse_document, DocumentAssembler, ParseOutcome, Stage};
pub use input::{parse_file, parse_reader, read_source};
