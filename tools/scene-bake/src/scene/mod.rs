//! Read-only view over a parsed scene
//!
//! The parser itself lives outside this crate. What it hands over is an
//! arena: nodes, meshes, materials and textures stored in flat arrays and
//! addressed by small integer ids assigned at discovery time. Every derived
//! record in the baker is index-aligned to these arrays.
//!
//! All types round-trip through serde so a parsed scene can be stored as JSON
//! and fed back through [`JsonSceneLoader`].

mod animation;
mod loader;
mod material;
mod mesh;
mod node;

pub use animation::{AnimationLayer, AnimationStack, Curve, CurveKey, NodeCurves, TimeSpan};
pub use loader::{JsonSceneLoader, SceneLoader};
pub use material::{Material, Property, PropertyValue, SurfaceKind, Texture};
pub use mesh::{Cluster, LayerElement, MappingMode, Mesh, ReferenceMode, Skin};
pub use node::{Node, RotationOrder, TransformComponents};

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};
use crate::math::mat4_from_scene;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Index into [`Scene::nodes`]
    NodeId
);
arena_id!(
    /// Index into [`Scene::meshes`]
    MeshId
);
arena_id!(
    /// Index into [`Scene::materials`]
    MaterialId
);
arena_id!(
    /// Index into [`Scene::textures`]
    TextureId
);

/// Bind/rest pose: one scene-convention matrix per listed node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_bind_pose: bool,
    pub entries: Vec<PoseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseEntry {
    pub node: NodeId,
    /// Row-major, translation in the last row
    pub matrix: [[f64; 4]; 4],
}

impl PoseEntry {
    pub fn to_mat4(&self) -> Mat4 {
        mat4_from_scene(&self.matrix)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// The scene's designated root node
    #[serde(default)]
    pub root: Option<NodeId>,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub textures: Vec<Texture>,
    #[serde(default)]
    pub poses: Vec<Pose>,
    #[serde(default)]
    pub animation_stacks: Vec<AnimationStack>,
    /// Index into `animation_stacks` of the active stack
    #[serde(default)]
    pub current_stack: Option<usize>,
}

impl Scene {
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| ImportError::malformed(format!("node {} does not exist", id.0)))
    }

    pub fn mesh(&self, id: MeshId) -> Result<&Mesh> {
        self.meshes
            .get(id.0)
            .ok_or_else(|| ImportError::malformed(format!("mesh {} does not exist", id.0)))
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material> {
        self.materials
            .get(id.0)
            .ok_or_else(|| ImportError::malformed(format!("material {} does not exist", id.0)))
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture> {
        self.textures
            .get(id.0)
            .ok_or_else(|| ImportError::malformed(format!("texture {} does not exist", id.0)))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Parent of every node, derived from the children lists
    pub fn parents(&self) -> Result<Vec<Option<NodeId>>> {
        let mut parents = vec![None; self.nodes.len()];
        for parent in self.node_ids() {
            for &child in &self.node(parent)?.children {
                self.node(child)?;
                if parents[child.0].replace(parent).is_some() {
                    return Err(ImportError::malformed(format!(
                        "node {} has more than one parent",
                        child.0
                    )));
                }
            }
        }
        if let Some(root) = self.root {
            self.node(root)?;
            if parents[root.0].is_some() {
                return Err(ImportError::malformed(format!(
                    "root node {} has a parent",
                    root.0
                )));
            }
        }
        Ok(parents)
    }

    /// Global transform of every node at rest, composed from local transforms
    pub fn global_transforms(&self) -> Result<Vec<Mat4>> {
        let locals = self
            .nodes
            .iter()
            .map(|n| n.local_transform())
            .collect::<Result<Vec<_>>>()?;
        compose_globals(&locals, &self.parents()?)
    }

    /// The stack to bake: the active one, else the first one
    pub fn selected_stack(&self) -> Option<&AnimationStack> {
        self.current_stack
            .and_then(|i| self.animation_stacks.get(i))
            .or_else(|| self.animation_stacks.first())
    }

    /// Local transform of `node` at `time` seconds into `stack`
    pub fn evaluate_local_transform(
        &self,
        node: NodeId,
        stack: &AnimationStack,
        time: f64,
    ) -> Result<Mat4> {
        let node_ref = self.node(node)?;
        let components = stack.evaluate_components(node, node_ref, time);
        node_ref.compose(&components)
    }
}

/// Multiply local transforms down the hierarchy
///
/// `parents` must describe a forest; a chain longer than the node count
/// means a cycle and is rejected.
pub(crate) fn compose_globals(locals: &[Mat4], parents: &[Option<NodeId>]) -> Result<Vec<Mat4>> {
    let mut globals: Vec<Option<Mat4>> = vec![None; locals.len()];

    for start in 0..locals.len() {
        let mut chain = Vec::new();
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            if globals[i].is_some() {
                break;
            }
            chain.push(i);
            if chain.len() > locals.len() {
                return Err(ImportError::malformed("node hierarchy contains a cycle"));
            }
            cursor = parents[i].map(|p| p.0);
        }

        for &i in chain.iter().rev() {
            let parent = parents[i].and_then(|p| globals[p.0]);
            globals[i] = Some(match parent {
                Some(parent_global) => parent_global * locals[i],
                None => locals[i],
            });
        }
    }

    Ok(globals.into_iter().map(|g| g.unwrap_or(Mat4::IDENTITY)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn node(name: &str, translation: [f64; 3], children: Vec<usize>) -> Node {
        Node {
            translation,
            children: children.into_iter().map(NodeId).collect(),
            ..Node::named(name)
        }
    }

    #[test]
    fn test_parents_from_children() {
        let scene = Scene {
            nodes: vec![
                node("root", [0.0; 3], vec![1, 2]),
                node("a", [0.0; 3], vec![]),
                node("b", [0.0; 3], vec![]),
            ],
            ..Default::default()
        };
        let parents = scene.parents().unwrap();
        assert_eq!(parents, vec![None, Some(NodeId(0)), Some(NodeId(0))]);
    }

    #[test]
    fn test_two_parents_is_malformed() {
        let scene = Scene {
            nodes: vec![
                node("a", [0.0; 3], vec![2]),
                node("b", [0.0; 3], vec![2]),
                node("c", [0.0; 3], vec![]),
            ],
            ..Default::default()
        };
        assert!(matches!(
            scene.parents(),
            Err(ImportError::MalformedScene(_))
        ));
    }

    #[test]
    fn test_root_with_parent_is_malformed() {
        let scene = Scene {
            root: Some(NodeId(1)),
            nodes: vec![node("a", [0.0; 3], vec![1]), node("b", [0.0; 3], vec![])],
            ..Default::default()
        };
        assert!(scene.parents().is_err());
    }

    #[test]
    fn test_dangling_child_is_malformed() {
        let scene = Scene {
            nodes: vec![node("a", [0.0; 3], vec![5])],
            ..Default::default()
        };
        assert!(scene.parents().is_err());
    }

    #[test]
    fn test_global_transforms_accumulate() {
        // child listed before its parent to exercise the chain walk
        let scene = Scene {
            nodes: vec![
                node("leaf", [0.0, 0.0, 3.0], vec![]),
                node("root", [1.0, 0.0, 0.0], vec![2]),
                node("mid", [0.0, 2.0, 0.0], vec![0]),
            ],
            ..Default::default()
        };
        let globals = scene.global_transforms().unwrap();
        let origin = |m: Mat4| m.transform_point3(Vec3::ZERO);
        assert_eq!(origin(globals[1]), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(origin(globals[2]), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(origin(globals[0]), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let parents = vec![Some(NodeId(1)), Some(NodeId(0))];
        let locals = vec![Mat4::IDENTITY; 2];
        assert!(compose_globals(&locals, &parents).is_err());
    }

    #[test]
    fn test_selected_stack_prefers_current() {
        let stack = |name: &str| AnimationStack {
            name: name.into(),
            span: TimeSpan {
                start: 0.0,
                stop: 1.0,
            },
            layers: Vec::new(),
        };
        let mut scene = Scene {
            animation_stacks: vec![stack("first"), stack("second")],
            ..Default::default()
        };
        assert_eq!(scene.selected_stack().map(|s| s.name.as_str()), Some("first"));

        scene.current_stack = Some(1);
        assert_eq!(scene.selected_stack().map(|s| s.name.as_str()), Some("second"));

        scene.animation_stacks.clear();
        assert!(scene.selected_stack().is_none());
    }
}
