//! Keyframe animation clips and the per-model playback clock.

use std::time::Duration;

use glam::{Quat, Vec3};

use crate::asset::model::NodeTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    /// Sampled through the keyframe values only; tangents are dropped at load time
    CubicSpline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translations(Vec<Vec3>),
    Rotations(Vec<Quat>),
    Scales(Vec<Vec3>),
}

impl ChannelValues {
    pub fn len(&self) -> usize {
        match self {
            ChannelValues::Translations(v) | ChannelValues::Scales(v) => v.len(),
            ChannelValues::Rotations(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keyframes driving one property of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Index into the model's node list
    pub node: usize,
    pub interpolation: Interpolation,
    /// Keyframe times in seconds, ascending
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

impl Channel {
    fn apply(&self, t: f32, target: &mut NodeTransform) {
        if self.times.is_empty() || self.values.len() < self.times.len() {
            return;
        }
        let (i0, i1, f) = keyframe_span(&self.times, t, self.interpolation);
        match &self.values {
            ChannelValues::Translations(v) => target.translation = v[i0].lerp(v[i1], f),
            ChannelValues::Scales(v) => target.scale = v[i0].lerp(v[i1], f),
            ChannelValues::Rotations(v) => target.rotation = v[i0].slerp(v[i1], f).normalize(),
        }
    }
}

/// Surrounding keyframe indices and blend factor for time `t`
fn keyframe_span(times: &[f32], t: f32, interpolation: Interpolation) -> (usize, usize, f32) {
    let last = times.len() - 1;
    if t <= times[0] {
        return (0, 0, 0.0);
    }
    if t >= times[last] {
        return (last, last, 0.0);
    }
    let next = times.partition_point(|&k| k <= t);
    let prev = next - 1;
    if interpolation == Interpolation::Step {
        return (prev, prev, 0.0);
    }
    let span = times[next] - times[prev];
    let f = if span > 0.0 { (t - times[prev]) / span } else { 0.0 };
    (prev, next, f)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: Option<String>,
    pub channels: Vec<Channel>,
    /// Seconds; the last keyframe time across all channels
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: Option<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0_f32, f32::max);
        Self { name, channels, duration }
    }

    /// Pose every targeted node at clip time `t`
    pub fn sample(&self, t: f32, nodes: &mut [NodeTransform]) {
        for channel in &self.channels {
            if let Some(target) = nodes.get_mut(channel.node) {
                channel.apply(t, target);
            }
        }
    }
}

/// Looping playback clock for a single clip
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    clip: AnimationClip,
    elapsed: f64,
}

impl AnimationDriver {
    /// Start the first clip; further clips are not played.
    pub fn play_first(clips: &[AnimationClip]) -> Option<Self> {
        let clip = clips.first()?.clone();
        Some(Self { clip, elapsed: 0.0 })
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    /// Total time advanced since playback began (seconds)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Playhead position within the looping clip
    pub fn clip_time(&self) -> f32 {
        let duration = self.clip.duration as f64;
        if duration <= 0.0 {
            return 0.0;
        }
        (self.elapsed % duration) as f32
    }

    pub fn advance(&mut self, dt: Duration, nodes: &mut [NodeTransform]) {
        self.elapsed += dt.as_secs_f64();
        let t = self.clip_time();
        self.clip.sample(t, nodes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_clip() -> AnimationClip {
        AnimationClip::new(
            Some("slide".into()),
            vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 2.0],
                values: ChannelValues::Translations(vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)]),
            }],
        )
    }

    #[test]
    fn test_linear_translation_sample() {
        let clip = slide_clip();
        assert_eq!(clip.duration, 2.0);
        let mut nodes = vec![NodeTransform::IDENTITY];
        clip.sample(0.5, &mut nodes);
        assert!((nodes[0].translation.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_holds_previous_key() {
        let mut clip = slide_clip();
        clip.channels[0].interpolation = Interpolation::Step;
        let mut nodes = vec![NodeTransform::IDENTITY];
        clip.sample(1.9, &mut nodes);
        assert_eq!(nodes[0].translation, Vec3::ZERO);
    }

    #[test]
    fn test_rotation_slerp_midpoint() {
        let clip = AnimationClip::new(
            None,
            vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                values: ChannelValues::Rotations(vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ]),
            }],
        );
        let mut nodes = vec![NodeTransform::IDENTITY];
        clip.sample(0.5, &mut nodes);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(nodes[0].rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_driver_loops_and_accumulates() {
        let mut driver = AnimationDriver::play_first(&[slide_clip()]).unwrap();
        let mut nodes = vec![NodeTransform::IDENTITY];
        driver.advance(Duration::from_millis(1500), &mut nodes);
        driver.advance(Duration::from_millis(1000), &mut nodes);
        assert!((driver.elapsed() - 2.5).abs() < 1e-9);
        assert!((driver.clip_time() - 0.5).abs() < 1e-6);
        assert!((nodes[0].translation.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_only_first_clip_plays() {
        let mut second = slide_clip();
        second.name = Some("second".into());
        let first = AnimationClip::new(Some("first".into()), vec![]);
        let driver = AnimationDriver::play_first(&[first, second]).unwrap();
        assert_eq!(driver.clip().name.as_deref(), Some("first"));
        assert!(AnimationDriver::play_first(&[]).is_none());
    }

    #[test]
    fn test_out_of_range_node_ignored() {
        let mut clip = slide_clip();
        clip.channels[0].node = 7;
        let mut nodes = vec![NodeTransform::IDENTITY];
        clip.sample(1.0, &mut nodes);
        assert_eq!(nodes[0], NodeTransform::IDENTITY);
    }
}
