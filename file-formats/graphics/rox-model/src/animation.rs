//! Skeletal animation clips.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use custom_debug::Debug;
use glam::{Quat, Vec3};
use rox_data::prelude::*;
use rox_utils::debug::trimmed_collection_fmt;

use crate::anim::{AnimReader, AnimWriter};
use crate::error::{ModelError, Result};

/// A bone pose at a point in time. `time` is in seconds.
#[derive(Debug, Clone, Copy, PartialEq, RoxHeaderR, RoxHeaderW)]
pub struct Keyframe {
    pub time: f32,
    pub translation: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
}

impl Keyframe {
    /// The rest pose at `time`.
    pub fn identity(time: f32) -> Self {
        Self {
            time,
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn is_identity_pose(&self) -> bool {
        self.translation == Vec3::ZERO && self.scale == Vec3::ONE && self.rotation == Quat::IDENTITY
    }
}

impl Default for Keyframe {
    fn default() -> Self {
        Self::identity(0.0)
    }
}

/// Keyframes of one bone, sorted by time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneAnimation {
    #[debug(with = trimmed_collection_fmt)]
    pub keyframes: Vec<Keyframe>,
}

impl BoneAnimation {
    pub fn new(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }

    /// A track holding the rest pose at `0` and at `end`.
    pub fn identity(end: f32) -> Self {
        Self {
            keyframes: vec![Keyframe::identity(0.0), Keyframe::identity(end)],
        }
    }

    /// Time of the last keyframe
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    pub fn is_identity(&self) -> bool {
        self.keyframes.iter().all(Keyframe::is_identity_pose)
    }
}

/// A named clip with one track per model bone, aligned with the bone list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub name: String,
    pub bone_animations: Vec<BoneAnimation>,
}

impl Animation {
    pub fn new(name: impl Into<String>, bone_animations: Vec<BoneAnimation>) -> Self {
        Self {
            name: name.into(),
            bone_animations,
        }
    }

    pub fn num_tracks(&self) -> usize {
        self.bone_animations.len()
    }

    pub fn keyframe_count(&self) -> usize {
        self.bone_animations.iter().map(|t| t.keyframes.len()).sum()
    }

    /// Length of the clip in seconds: the latest keyframe over all tracks.
    pub fn duration(&self) -> f32 {
        self.bone_animations
            .iter()
            .map(BoneAnimation::duration)
            .fold(0.0, f32::max)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        AnimReader::new(BufReader::new(file)).read()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ModelError::FileCreate {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        AnimWriter::new(&mut writer).write(self)?;
        writer.flush()?;
        Ok(())
    }
}
