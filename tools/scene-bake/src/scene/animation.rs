//! Animation stacks and curve evaluation

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{Node, NodeId, TransformComponents};

/// Local time span of a stack, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub stop: f64,
}

impl TimeSpan {
    pub fn duration(&self) -> f64 {
        (self.stop - self.start).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f64,
    pub value: f64,
}

/// Scalar curve, keys sorted by time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub keys: Vec<CurveKey>,
}

impl Curve {
    /// Linear interpolation between keys, clamped to the first/last key
    pub fn evaluate(&self, t: f64) -> Option<f64> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if t <= first.time {
            return Some(first.value);
        }
        if t >= last.time {
            return Some(last.value);
        }

        // Find keyframes
        let i = self.keys.partition_point(|k| k.time <= t).saturating_sub(1);
        let k0 = self.keys[i];
        let k1 = self.keys[(i + 1).min(self.keys.len() - 1)];

        let factor = if k1.time > k0.time {
            (t - k0.time) / (k1.time - k0.time)
        } else {
            0.0
        };
        Some(k0.value + (k1.value - k0.value) * factor.clamp(0.0, 1.0))
    }
}

/// Curves driving one node's transform components (x, y, z each optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCurves {
    pub node: NodeId,
    #[serde(default)]
    pub translation: [Option<Curve>; 3],
    /// Degrees
    #[serde(default)]
    pub rotation: [Option<Curve>; 3],
    #[serde(default)]
    pub scaling: [Option<Curve>; 3],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationLayer {
    #[serde(default)]
    pub name: String,
    pub curves: Vec<NodeCurves>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationStack {
    pub name: String,
    pub span: TimeSpan,
    #[serde(default)]
    pub layers: Vec<AnimationLayer>,
}

fn apply(curves: &[Option<Curve>; 3], t: f64, target: &mut Vec3) {
    for (axis, curve) in curves.iter().enumerate() {
        if let Some(value) = curve.as_ref().and_then(|c| c.evaluate(t)) {
            target[axis] = value as f32;
        }
    }
}

impl AnimationStack {
    /// Transform components of `node` at `time`
    ///
    /// Starts from the node's static components; later layers override
    /// earlier ones per axis. Inactive components stay at identity.
    pub fn evaluate_components(&self, id: NodeId, node: &Node, time: f64) -> TransformComponents {
        let mut components = node.components();
        for curves in self
            .layers
            .iter()
            .flat_map(|l| l.curves.iter())
            .filter(|c| c.node == id)
        {
            if node.translation_active {
                apply(&curves.translation, time, &mut components.translation);
            }
            if node.rotation_active {
                apply(&curves.rotation, time, &mut components.rotation);
            }
            if node.scaling_active {
                apply(&curves.scaling, time, &mut components.scaling);
            }
        }
        components
    }
}
