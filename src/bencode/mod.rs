pub mod bvalue;
pub mod decode;
pub mod encode;
pub mod error;

pub use bvalue::BValue;   // re-export
pub use decode::{decode, decode_bencode};   // re-export
pub use encode::{bvalue_to_json, encode_bvalue};   // re-export
pub use error::{DecodeError, ErrorKind};   // re-export
