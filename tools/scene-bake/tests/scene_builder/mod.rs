//! Programmatic test scenes
//!
//! Builds small scenes in memory and writes them as JSON dumps the
//! `JsonSceneLoader` (and the CLI) can read back.

#![allow(dead_code)]

use std::path::Path;

use scene_bake::scene::{
    AnimationLayer, AnimationStack, Cluster, Curve, CurveKey, LayerElement, MappingMode, Material,
    MaterialId, Mesh, MeshId, Node, NodeCurves, NodeId, Pose, PoseEntry, Property, PropertyValue,
    ReferenceMode, Scene, Skin, SurfaceKind, Texture, TextureId, TimeSpan,
};

pub const IDENTITY: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Scene-convention translation matrix (translation in the last row)
pub fn translation_matrix(x: f64, y: f64, z: f64) -> [[f64; 4]; 4] {
    let mut m = IDENTITY;
    m[3] = [x, y, z, 1.0];
    m
}

pub fn direct_normals(count: usize, normal: [f64; 3]) -> LayerElement<[f64; 3]> {
    LayerElement {
        mapping_mode: MappingMode::ByPolygonVertex,
        reference_mode: ReferenceMode::Direct,
        direct: vec![normal; count],
        index: Vec::new(),
    }
}

pub fn indexed_uvs(direct: Vec<[f64; 2]>, index: Vec<usize>) -> LayerElement<[f64; 2]> {
    LayerElement {
        mapping_mode: MappingMode::ByPolygonVertex,
        reference_mode: ReferenceMode::IndexToDirect,
        direct,
        index,
    }
}

pub fn all_same_material(material: usize) -> LayerElement<MaterialId> {
    LayerElement {
        mapping_mode: MappingMode::AllSame,
        reference_mode: ReferenceMode::IndexToDirect,
        direct: vec![MaterialId(material)],
        index: vec![0],
    }
}

pub fn by_polygon_materials(direct: &[usize], index: Vec<usize>) -> LayerElement<MaterialId> {
    LayerElement {
        mapping_mode: MappingMode::ByPolygon,
        reference_mode: ReferenceMode::IndexToDirect,
        direct: direct.iter().copied().map(MaterialId).collect(),
        index,
    }
}

pub fn linear_curve(keys: &[(f64, f64)]) -> Curve {
    Curve {
        keys: keys
            .iter()
            .map(|&(time, value)| CurveKey { time, value })
            .collect(),
    }
}

/// A unit quad in the XZ plane: one polygon, one material, direct normals
pub fn quad_mesh() -> Mesh {
    Mesh {
        name: "quad".into(),
        control_points: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        polygons: vec![vec![0, 1, 2, 3]],
        normals: Some(direct_normals(4, [0.0, 1.0, 0.0])),
        uvs: Some(indexed_uvs(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![0, 1, 2, 3],
        )),
        materials: Some(all_same_material(0)),
        skins: Vec::new(),
    }
}

pub fn lambert(name: &str, diffuse: [f64; 3]) -> Material {
    Material {
        diffuse: Some(diffuse),
        ..Material::named(name, SurfaceKind::Lambert)
    }
}

/// One node carrying the quad
pub fn quad_scene() -> Scene {
    Scene {
        root: Some(NodeId(0)),
        nodes: vec![Node {
            mesh: Some(MeshId(0)),
            ..Node::named("quad_node")
        }],
        meshes: vec![quad_mesh()],
        materials: vec![lambert("floor", [0.8, 0.8, 0.8])],
        ..Default::default()
    }
}

/// A box with two materials: +Y face uses "top", the other five use "side"
pub fn two_material_box() -> Scene {
    let control_points = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let polygons = vec![
        vec![3, 2, 6, 7], // top
        vec![0, 1, 2, 3],
        vec![4, 5, 6, 7],
        vec![0, 4, 7, 3],
        vec![1, 5, 6, 2],
        vec![0, 1, 5, 4],
    ];
    let mesh = Mesh {
        name: "box".into(),
        control_points,
        polygons,
        normals: None,
        uvs: None,
        materials: Some(by_polygon_materials(&[0, 1], vec![1, 0, 0, 0, 0, 0])),
        skins: Vec::new(),
    };

    let mut textured = lambert("top", [1.0, 0.0, 0.0]);
    textured.properties.push(Property {
        name: "DiffuseColor".into(),
        value: PropertyValue::Color([1.0, 0.0, 0.0]),
        textures: vec![TextureId(0)],
    });

    Scene {
        root: Some(NodeId(0)),
        nodes: vec![Node {
            mesh: Some(MeshId(0)),
            ..Node::named("box_node")
        }],
        meshes: vec![mesh],
        materials: vec![lambert("side", [0.2, 0.2, 0.2]), textured],
        textures: vec![Texture {
            name: "grass".into(),
            file_name: "C:/art/grass.png".into(),
            relative_file_name: "textures/grass.png".into(),
        }],
        ..Default::default()
    }
}

/// Three-bone arm with a skinned strip, a bind pose and a one-second bend
///
/// Nodes: 0 root (carries the mesh), 1 upper, 2 lower. The lower bone's X
/// rotation goes 0 -> 90 degrees over the clip.
pub fn skinned_arm() -> Scene {
    let mesh = Mesh {
        name: "arm".into(),
        control_points: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 2.0, 0.0],
            [0.0, 2.0, 0.0],
            [1.0, 4.0, 0.0],
            [0.0, 4.0, 0.0],
        ],
        polygons: vec![vec![0, 1, 2, 3], vec![3, 2, 4, 5]],
        normals: Some(direct_normals(8, [0.0, 0.0, 1.0])),
        uvs: None,
        materials: Some(all_same_material(0)),
        skins: vec![Skin {
            clusters: vec![
                Cluster {
                    link: NodeId(1),
                    indices: vec![0, 1, 2, 3],
                    weights: vec![1.0, 1.0, 0.5, 0.5],
                },
                Cluster {
                    link: NodeId(2),
                    indices: vec![2, 3, 4, 5],
                    weights: vec![0.5, 0.5, 1.0, 1.0],
                },
            ],
        }],
    };

    let bend = AnimationStack {
        name: "bend".into(),
        span: TimeSpan {
            start: 0.0,
            stop: 1.0,
        },
        layers: vec![AnimationLayer {
            name: "base".into(),
            curves: vec![NodeCurves {
                node: NodeId(2),
                translation: Default::default(),
                rotation: [Some(linear_curve(&[(0.0, 0.0), (1.0, 90.0)])), None, None],
                scaling: Default::default(),
            }],
        }],
    };

    Scene {
        root: Some(NodeId(0)),
        nodes: vec![
            Node {
                children: vec![NodeId(1)],
                mesh: Some(MeshId(0)),
                ..Node::named("root")
            },
            Node {
                children: vec![NodeId(2)],
                ..Node::named("upper")
            },
            Node {
                translation: [0.0, 2.0, 0.0],
                ..Node::named("lower")
            },
        ],
        meshes: vec![mesh],
        materials: vec![lambert("skin", [0.9, 0.7, 0.6])],
        poses: vec![Pose {
            name: "bind".into(),
            is_bind_pose: true,
            entries: vec![
                PoseEntry {
                    node: NodeId(0),
                    matrix: IDENTITY,
                },
                PoseEntry {
                    node: NodeId(1),
                    matrix: IDENTITY,
                },
                PoseEntry {
                    node: NodeId(2),
                    matrix: translation_matrix(0.0, 2.0, 0.0),
                },
            ],
        }],
        animation_stacks: vec![bend],
        ..Default::default()
    }
}

/// Write `scene` as a JSON dump
pub fn write_scene(path: &Path, scene: &Scene) {
    let json = serde_json::to_string_pretty(scene).expect("Failed to serialize scene");
    std::fs::write(path, json).expect("Failed to write scene");
}
