//! Animation baking
//!
//! Samples the selected animation stack at a fixed rate into bone-indexed
//! frames, and derives the rest skeleton (local/absolute transforms and
//! parent indices) the frames are expressed against.

use std::collections::BTreeMap;

use glam::Mat4;
use model_common::{AnimationData, AnimationFrame, AnimationSequence, Bone, Matrix4, NO_PARENT};

use crate::error::{ImportError, Result};
use crate::hierarchy::{parent_indices, rest_global, Hierarchy};
use crate::scene::{AnimationStack, Scene};

/// Tolerance for `duration * rate` landing just below a whole number
const FRAME_EPSILON: f64 = 1e-9;

/// Number of samples for a span of `duration` seconds at `rate` samples/s,
/// both ends included
///
/// This is `floor(duration * rate) + 1` with a deliberate tolerance of
/// [`FRAME_EPSILON`]: a product such as `0.29 * 100.0` that evaluates to
/// `28.999999999999996` still counts its end frame (30 frames, not 29).
pub fn frame_count(duration: f64, rate: f64) -> usize {
    if !(duration > 0.0 && rate > 0.0) {
        return 1;
    }
    (duration * rate + FRAME_EPSILON).floor() as usize + 1
}

pub struct AnimationBaker<'a> {
    scene: &'a Scene,
    hierarchy: &'a Hierarchy,
    rate: f64,
}

impl<'a> AnimationBaker<'a> {
    /// Baker sampling at `rate` samples per second
    pub fn new(scene: &'a Scene, hierarchy: &'a Hierarchy, rate: f64) -> Self {
        Self {
            scene,
            hierarchy,
            rate,
        }
    }

    /// Bake the scene's selected stack; `None` when the scene has no stacks
    pub fn bake(&self) -> Result<Option<AnimationData>> {
        let Some(stack) = self.scene.selected_stack() else {
            tracing::debug!("No animation stacks, skipping animation");
            return Ok(None);
        };
        if self.hierarchy.len() != self.scene.nodes.len() {
            return Err(ImportError::malformed(format!(
                "{} bones for {} nodes",
                self.hierarchy.len(),
                self.scene.nodes.len()
            )));
        }

        let sequence = self.sample(stack)?;
        let (bone_transforms, absolute_transforms, parents) = self.rest_skeleton()?;

        tracing::info!(
            "Animation '{}': {} frames over {:.3}s",
            sequence.name,
            sequence.frames.len(),
            sequence.duration
        );

        let mut sequences = BTreeMap::new();
        sequences.insert(sequence.name.clone(), sequence);
        Ok(Some(AnimationData {
            sequences,
            bone_transforms,
            absolute_transforms,
            parent_indices: parents,
        }))
    }

    /// Every bone's local transform at each sample time of `stack`
    pub fn sample(&self, stack: &AnimationStack) -> Result<AnimationSequence> {
        let start = stack.span.start;
        let duration = stack.span.duration();
        let count = frame_count(duration, self.rate);

        let mut frames = Vec::with_capacity(count);
        for k in 0..count {
            let offset = (k as f64 / self.rate).min(duration);
            let transforms = self
                .scene
                .node_ids()
                .map(|node| {
                    self.scene
                        .evaluate_local_transform(node, stack, start + offset)
                        .map(Matrix4::from)
                })
                .collect::<Result<Vec<_>>>()?;
            frames.push(AnimationFrame {
                time: offset as f32,
                transforms,
            });
        }

        Ok(AnimationSequence {
            name: stack.name.clone(),
            duration: duration as f32,
            frames,
        })
    }

    /// Local rest transforms, absolute (inverse global) rest transforms and
    /// parent indices, all parallel to the bone list
    pub fn rest_skeleton(&self) -> Result<(Vec<Matrix4>, Vec<Matrix4>, Vec<i32>)> {
        let bones: &[Bone] = &self.hierarchy.bones;
        let hierarchy_globals = self.scene.global_transforms()?;
        let globals: Vec<Mat4> = bones
            .iter()
            .zip(hierarchy_globals)
            .map(|(bone, global)| rest_global(bone, global))
            .collect();
        let parents = parent_indices(bones);

        let locals = globals
            .iter()
            .zip(&parents)
            .map(|(global, &parent)| {
                let local = if parent == NO_PARENT {
                    *global
                } else {
                    globals[parent as usize].inverse() * *global
                };
                Matrix4::from(local)
            })
            .collect();
        let absolutes = globals.iter().map(|g| Matrix4::from(g.inverse())).collect();

        Ok((locals, absolutes, parents))
    }
}
