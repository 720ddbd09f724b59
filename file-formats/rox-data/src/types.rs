use crate::error::Result;

pub use std::io::{Read, Write};

/// A fixed-width record that can be decoded field by field.
pub trait RoxHeaderR: Sized {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self>;
}

/// A fixed-width record that can be encoded field by field.
pub trait RoxHeaderW {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Encoded size in bytes.
    fn rox_size(&self) -> usize;
}

pub trait RoxReaderForHeader<T: RoxHeaderR>: Read + Sized {
    fn rox_read(&mut self) -> Result<T> {
        T::rox_read(self)
    }
}
impl<T: RoxHeaderR, R: Read> RoxReaderForHeader<T> for R {}

pub trait RoxWriterForHeader<T: RoxHeaderW>: Write + Sized {
    fn rox_write(&mut self, value: &T) -> Result<()> {
        value.rox_write(self)
    }
}
impl<T: RoxHeaderW, W: Write> RoxWriterForHeader<T> for W {}
