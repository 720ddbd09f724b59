//! Stream codec for `.anim` files.

use log::debug;
use rox_data::error::RoxDataError;
use rox_data::prelude::*;

use crate::animation::{Animation, BoneAnimation};
use crate::error::{ModelError, Result};
use crate::header::{AnimHeader, BoneAnimHeader, KEYFRAME_SIZE};
use crate::modl::{count_u32, payload_len};

/// Writes an [`Animation`] in the `.anim` layout.
#[derive(Debug)]
pub struct AnimWriter<W: Write> {
    writer: W,
}

impl<W: Write> AnimWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Fails with [`ModelError::TooManyTracks`] when the clip has more tracks
    /// than the one-byte track count holds.
    pub fn write(&mut self, animation: &Animation) -> Result<()> {
        let track_count = animation.bone_animations.len();
        let bone_animation_count =
            u8::try_from(track_count).map_err(|_| ModelError::TooManyTracks {
                name: animation.name.clone(),
                count: track_count,
            })?;

        self.writer.rox_write(&AnimHeader {
            bone_animation_count,
            name_len: name_len(&animation.name)?,
        })?;
        self.writer.write_name(&animation.name)?;

        for track in &animation.bone_animations {
            let keyframe_count = count_u32("keyframes", track.keyframes.len())?;
            self.writer.rox_write(&BoneAnimHeader {
                keyframe_count,
                keyframe_size_bytes: payload_len(
                    "keyframes",
                    u64::from(keyframe_count),
                    KEYFRAME_SIZE,
                )?,
            })?;
            self.writer.write_records(&track.keyframes)?;
        }

        debug!(
            "Wrote animation '{}': {} tracks",
            animation.name, track_count
        );
        Ok(())
    }
}

/// Reads an [`Animation`] from the `.anim` layout.
#[derive(Debug)]
pub struct AnimReader<R: Read> {
    reader: R,
}

impl<R: Read> AnimReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn read(&mut self) -> Result<Animation> {
        let header: AnimHeader = self.reader.rox_read()?;
        let name = self.reader.read_name(header.name_len, "animation")?;

        let mut bone_animations = Vec::with_capacity(header.bone_animation_count as usize);
        for _ in 0..header.bone_animation_count {
            let track_header: BoneAnimHeader = self.reader.rox_read()?;
            let expected = payload_len(
                "keyframes",
                u64::from(track_header.keyframe_count),
                KEYFRAME_SIZE,
            )?;
            if track_header.keyframe_size_bytes < expected {
                return Err(RoxDataError::PayloadTooShort {
                    expected: expected as usize,
                    actual: track_header.keyframe_size_bytes as usize,
                }
                .into());
            }

            // Trailing bytes past the declared keyframes are consumed and ignored
            let bytes = self.reader.read_payload(track_header.keyframe_size_bytes)?;
            let keyframes = decode_records(&bytes, track_header.keyframe_count as usize)?;
            bone_animations.push(BoneAnimation::new(keyframes));
        }

        debug!(
            "Read animation '{}': {} tracks",
            name,
            bone_animations.len()
        );
        Ok(Animation {
            name,
            bone_animations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Keyframe;
    use std::io::Cursor;

    fn encode(animation: &Animation) -> Vec<u8> {
        let mut writer = AnimWriter::new(Vec::new());
        writer.write(animation).unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_layout() {
        let data = encode(&Animation::new("run", vec![BoneAnimation::identity(1.0)]));
        // header(5) + name(3) + track header(12) + 2 keyframes
        assert_eq!(data.len(), 5 + 3 + 12 + 88);
        assert_eq!(data[0], 1);
        assert_eq!(&data[8..12], &2u32.to_le_bytes());
        assert_eq!(&data[12..20], &88u64.to_le_bytes());
    }

    #[test]
    fn test_too_many_tracks() {
        let animation = Animation::new("crowd", vec![BoneAnimation::identity(1.0); 256]);
        let err = AnimWriter::new(Vec::new()).write(&animation).unwrap_err();
        assert!(matches!(err, ModelError::TooManyTracks { count: 256, .. }));
    }

    #[test]
    fn test_255_tracks_fit() {
        let animation = Animation::new("crowd", vec![BoneAnimation::identity(1.0); 255]);
        let read = AnimReader::new(Cursor::new(encode(&animation)))
            .read()
            .unwrap();
        assert_eq!(read.num_tracks(), 255);
    }

    #[test]
    fn test_short_keyframe_payload_is_rejected() {
        let mut data = encode(&Animation::new("run", vec![BoneAnimation::identity(1.0)]));
        data[12..20].copy_from_slice(&44u64.to_le_bytes());

        let err = AnimReader::new(Cursor::new(data)).read().unwrap_err();
        assert!(matches!(
            err,
            ModelError::Data(RoxDataError::PayloadTooShort {
                expected: 88,
                actual: 44
            })
        ));
    }

    #[test]
    fn test_trailing_keyframe_bytes_are_skipped() {
        let animation = Animation::new(
            "run",
            vec![
                BoneAnimation::identity(1.0),
                BoneAnimation::new(vec![Keyframe::identity(0.0), Keyframe::identity(2.0)]),
            ],
        );
        let mut data = encode(&animation);
        // Grow the first track's payload by 4 bytes
        data[12..20].copy_from_slice(&92u64.to_le_bytes());
        data.splice(108..108, [0xAA; 4]);

        let read = AnimReader::new(Cursor::new(data)).read().unwrap();
        assert_eq!(read, animation);
    }
}
