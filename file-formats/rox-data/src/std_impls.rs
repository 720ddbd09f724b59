use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::error::Result;

use super::types::*;

impl RoxHeaderR for u8 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u8()?)
    }
}
impl RoxHeaderW for u8 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(*self)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        1
    }
}

impl RoxHeaderR for u16 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u16::<LittleEndian>()?)
    }
}
impl RoxHeaderW for u16 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(*self)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        2
    }
}

impl RoxHeaderR for u32 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u32::<LittleEndian>()?)
    }
}
impl RoxHeaderW for u32 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(*self)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        4
    }
}

impl RoxHeaderR for u64 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u64::<LittleEndian>()?)
    }
}
impl RoxHeaderW for u64 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(*self)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        8
    }
}

impl RoxHeaderR for f32 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_f32::<LittleEndian>()?)
    }
}
impl RoxHeaderW for f32 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<LittleEndian>(*self)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        4
    }
}

impl RoxHeaderR for [u8; 4] {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}
impl RoxHeaderW for [u8; 4] {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        4
    }
}

impl RoxHeaderR for [f32; 4] {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut values = [0.0; 4];
        reader.read_f32_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }
}
impl RoxHeaderW for [f32; 4] {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for value in self {
            writer.write_f32::<LittleEndian>(*value)?;
        }
        Ok(())
    }

    fn rox_size(&self) -> usize {
        16
    }
}

impl RoxHeaderR for Vec2 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        let x = reader.read_f32::<LittleEndian>()?;
        let y = reader.read_f32::<LittleEndian>()?;
        Ok(Self::new(x, y))
    }
}
impl RoxHeaderW for Vec2 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        8
    }
}

impl RoxHeaderR for Vec3 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        let x = reader.read_f32::<LittleEndian>()?;
        let y = reader.read_f32::<LittleEndian>()?;
        let z = reader.read_f32::<LittleEndian>()?;
        Ok(Self::new(x, y, z))
    }
}
impl RoxHeaderW for Vec3 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        writer.write_f32::<LittleEndian>(self.z)?;
        Ok(())
    }

    fn rox_size(&self) -> usize {
        12
    }
}

/// Stored as x, y, z, w.
impl RoxHeaderR for Quat {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        let xyzw: [f32; 4] = reader.rox_read()?;
        Ok(Self::from_array(xyzw))
    }
}
impl RoxHeaderW for Quat {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.rox_write(&self.to_array())
    }

    fn rox_size(&self) -> usize {
        16
    }
}

/// Stored row-major: sixteen floats, first row first.
impl RoxHeaderR for Mat4 {
    fn rox_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut rows = [0.0; 16];
        reader.read_f32_into::<LittleEndian>(&mut rows)?;
        Ok(Self::from_cols_array(&rows).transpose())
    }
}
impl RoxHeaderW for Mat4 {
    fn rox_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for value in self.transpose().to_cols_array() {
            writer.write_f32::<LittleEndian>(value)?;
        }
        Ok(())
    }

    fn rox_size(&self) -> usize {
        64
    }
}
