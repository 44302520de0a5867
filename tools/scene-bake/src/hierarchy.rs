//! Bone hierarchy flattening
//!
//! Every scene node becomes one bone, in scene order. The bone's position in
//! the list is its index for the rest of the import: child lists, skin
//! clusters, skeleton parent arrays and animation frames all use it.

use model_common::{Bone, Matrix4, NO_PARENT};

use crate::error::{ImportError, Result};
use crate::scene::{NodeId, Pose, Scene};

#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub bones: Vec<Bone>,
}

impl Hierarchy {
    /// Create one bone per node, then fill child lists
    pub fn build(scene: &Scene) -> Result<Self> {
        if u32::try_from(scene.nodes.len()).is_err() {
            return Err(ImportError::malformed("too many nodes for bone indices"));
        }

        let mut bones = scene
            .nodes
            .iter()
            .map(|node| Ok(Bone::new(node.name.clone(), node.local_transform()?.into())))
            .collect::<Result<Vec<_>>>()?;

        let bone_count = bones.len();
        for (bone, node) in bones.iter_mut().zip(&scene.nodes) {
            for &child in &node.children {
                bone.child_bones.push(checked_index(child, bone_count)?);
            }
        }

        tracing::debug!("Flattened {} nodes into bones", bone_count);
        Ok(Self { bones })
    }

    /// Bone index assigned to a node
    pub fn bone_index(&self, node: NodeId) -> Result<u32> {
        checked_index(node, self.bones.len())
    }

    /// Assign rest-pose matrices from the scene's pose
    ///
    /// Uses the first bind pose, or the first pose when none is marked as
    /// one. Matrices are converted to glam and assigned as-is, the root
    /// included.
    pub fn apply_pose(&mut self, scene: &Scene) -> Result<()> {
        let Some(pose) = select_pose(&scene.poses) else {
            return Ok(());
        };

        for entry in &pose.entries {
            let index = self.bone_index(entry.node)? as usize;
            self.bones[index].rest_pose = Some(entry.to_mat4().into());
        }

        tracing::debug!(
            "Applied pose '{}' to {} bones",
            pose.name,
            pose.entries.len()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn into_bones(self) -> Vec<Bone> {
        self.bones
    }
}

fn select_pose(poses: &[Pose]) -> Option<&Pose> {
    poses
        .iter()
        .find(|p| p.is_bind_pose)
        .or_else(|| poses.first())
}

fn checked_index(node: NodeId, bone_count: usize) -> Result<u32> {
    if node.0 < bone_count {
        Ok(node.0 as u32)
    } else {
        Err(ImportError::malformed(format!(
            "node {} has no bone ({} bones)",
            node.0, bone_count
        )))
    }
}

/// Parent of each bone, found by inverting the child lists
pub fn parent_indices(bones: &[Bone]) -> Vec<i32> {
    let mut parents = vec![NO_PARENT; bones.len()];
    for (parent, bone) in bones.iter().enumerate() {
        for &child in &bone.child_bones {
            if let Some(slot) = parents.get_mut(child as usize) {
                *slot = parent as i32;
            }
        }
    }
    parents
}

/// Rest transform of a bone: its pose matrix, else the composed global
pub fn rest_global(bone: &Bone, hierarchy_global: glam::Mat4) -> glam::Mat4 {
    bone.rest_pose
        .map(|m: Matrix4| m.to_mat4())
        .unwrap_or(hierarchy_global)
}
