//! Scene animation channels to per-bone keyframe tracks.

use std::collections::HashMap;

use log::debug;
use rox_model::{Animation, BoneAnimation, Keyframe};

use crate::scene::{NodeChannel, SceneAnimation};
use crate::skeleton::Skeleton;

/// Tick rate assumed when a clip reports zero ticks per second.
pub const DEFAULT_TICKS_PER_SECOND: f64 = 30.0;

/// Keyframes keyed by their source time in ticks.
#[derive(Debug, Default)]
struct TrackBuilder {
    keys: Vec<(f64, Keyframe)>,
}

impl TrackBuilder {
    /// The keyframe at exactly `time`, inserted as the rest pose if absent.
    fn at(&mut self, time: f64) -> &mut Keyframe {
        let index = match self.keys.iter().position(|(t, _)| *t == time) {
            Some(index) => index,
            None => {
                self.keys.push((time, Keyframe::default()));
                self.keys.len() - 1
            }
        };
        &mut self.keys[index].1
    }
}

fn clip_ticks_per_second(animation: &SceneAnimation) -> f64 {
    if animation.ticks_per_second > 0.0 {
        animation.ticks_per_second
    } else {
        DEFAULT_TICKS_PER_SECOND
    }
}

/// A rest-pose track spanning the clip, or one tick for an empty clip.
fn identity_track(duration: f64, ticks_per_second: f64) -> BoneAnimation {
    let end = if duration > 0.0 { duration } else { 1.0 };
    BoneAnimation::identity(to_seconds(end, ticks_per_second))
}

fn to_seconds(ticks: f64, ticks_per_second: f64) -> f32 {
    (ticks / ticks_per_second) as f32
}

/// Merges one channel into a sorted track with times in seconds.
///
/// Scale keys are merged first, then positions, then rotations. Keys whose
/// time in seconds does not come after the previous keyframe are dropped. A
/// lone keyframe is followed by a rest-pose keyframe at the clip end, or one
/// tick later when the key already sits at or past the end.
pub fn normalize_track(channel: &NodeChannel, duration: f64, ticks_per_second: f64) -> BoneAnimation {
    let mut builder = TrackBuilder::default();
    for key in &channel.scale_keys {
        builder.at(key.time).scale = key.value;
    }
    for key in &channel.position_keys {
        builder.at(key.time).translation = key.value;
    }
    for key in &channel.rotation_keys {
        builder.at(key.time).rotation = key.value;
    }

    let mut keys = builder.keys;
    if keys.is_empty() {
        return identity_track(duration, ticks_per_second);
    }
    keys.sort_by(|a, b| a.0.total_cmp(&b.0));
    let first_tick = keys[0].0;

    let mut keyframes: Vec<Keyframe> = Vec::with_capacity(keys.len() + 1);
    let mut collapsed = 0;
    for (ticks, keyframe) in keys {
        let time = to_seconds(ticks, ticks_per_second);
        if keyframes.last().is_some_and(|last| time <= last.time) {
            collapsed += 1;
            continue;
        }
        keyframes.push(Keyframe { time, ..keyframe });
    }
    if collapsed > 0 {
        debug!(
            "Channel '{}': dropped {} keys sharing a time in seconds",
            channel.node_name, collapsed
        );
    }

    if let [only] = keyframes[..] {
        let end_ticks = if duration > first_tick {
            duration
        } else {
            first_tick + 1.0
        };
        let mut end = to_seconds(end_ticks, ticks_per_second);
        if end <= only.time {
            end = only.time.next_up();
        }
        keyframes.push(Keyframe::identity(end));
    }

    BoneAnimation::new(keyframes)
}

/// Builds one track per skeleton bone, in bone order.
///
/// Bones without a channel get a rest-pose track. Channels that animate
/// nodes outside the skeleton are dropped.
pub fn normalize_animation(
    name: impl Into<String>,
    animation: &SceneAnimation,
    skeleton: &Skeleton,
) -> Animation {
    let name = name.into();
    let ticks_per_second = clip_ticks_per_second(animation);

    let mut channels: HashMap<&str, &NodeChannel> = HashMap::new();
    for channel in &animation.channels {
        channels.entry(channel.node_name.as_str()).or_insert(channel);
    }

    let dropped = channels
        .keys()
        .filter(|node| skeleton.index_of(node).is_none())
        .count();
    if dropped > 0 {
        debug!("Animation '{name}': dropped {dropped} channels on non-bone nodes");
    }

    let mut filled = 0;
    let bone_animations = skeleton
        .bones
        .iter()
        .map(|bone| match channels.get(bone.name.as_str()) {
            Some(channel) => normalize_track(channel, animation.duration, ticks_per_second),
            None => {
                filled += 1;
                identity_track(animation.duration, ticks_per_second)
            }
        })
        .collect();

    debug!(
        "Animation '{}': {} tracks, {} filled with the rest pose",
        name,
        skeleton.len(),
        filled
    );

    Animation {
        name,
        bone_animations,
    }
}
