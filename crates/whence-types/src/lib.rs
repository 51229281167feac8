//! Core value types for whence: the ordered string list used to build and
//! split strings, and the provenance record every collector writes into.

pub mod record;
pub mod string_list;

pub use record::{Field, ProvenanceRecord};
pub use string_list::{StringList, split};
