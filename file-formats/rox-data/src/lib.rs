//! Field-level codecs for the RoX binary formats.
//!
//! Every on-disk structure is a packed, little-endian sequence of fixed-width
//! fields. Types describe themselves through [`types::RoxHeaderR`] and
//! [`types::RoxHeaderW`]; header structs usually derive both with
//! `rox_data_derive`. Nothing here relies on in-memory struct layout.

extern crate self as rox_data;

pub mod error;
pub mod payload;
pub mod std_impls;
pub mod types;

pub mod prelude {
    pub use crate::payload::{RoxPayloadReader, RoxPayloadWriter, decode_records, name_len};
    pub use crate::types::{
        Read, RoxHeaderR, RoxHeaderW, RoxReaderForHeader, RoxWriterForHeader, Write,
    };
    pub use byteorder::{ReadBytesExt, WriteBytesExt};
    pub use rox_data_derive::{RoxHeaderR, RoxHeaderW};
}
