//! In-memory transform hierarchy
//!
//! A minimal rig host: named nodes with a parent, a local position and a
//! local rotation, plus meshes holding blendshape weights. No scale.

use crate::{Quat, Rig, Vec3};

/// Node handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Mesh handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    local_position: Vec3,
    local_rotation: Quat,
}

/// Transform hierarchy implementing [`Rig`]
#[derive(Debug, Clone, Default)]
pub struct SceneRig {
    nodes: Vec<Node>,
    meshes: Vec<Vec<f32>>,
    mutations: u64,
}

impl SceneRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. An unknown parent handle makes the node a root.
    pub fn add_node(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        local_position: Vec3,
        local_rotation: Quat,
    ) -> NodeId {
        let parent = parent.filter(|p| p.0 < self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            local_position,
            local_rotation,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Add a mesh with `channels` blendshapes, all at zero
    pub fn add_mesh(&mut self, channels: usize) -> MeshId {
        self.meshes.push(vec![0.0; channels]);
        MeshId(self.meshes.len() - 1)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|n| n.name.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn blend_shape_weight(&self, mesh: MeshId, index: usize) -> Option<f32> {
        self.meshes.get(mesh.0).and_then(|m| m.get(index)).copied()
    }

    /// Number of writes to meshes and existing nodes so far
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    pub fn world_position(&self, node: NodeId) -> Vec3 {
        let Some(n) = self.nodes.get(node.0) else {
            return Vec3::ZERO;
        };
        match n.parent {
            Some(parent) => {
                self.world_position(parent) + self.world_rotation_of(parent) * n.local_position
            }
            None => n.local_position,
        }
    }

    pub fn set_world_rotation(&mut self, node: NodeId, rotation: Quat) {
        let parent_rotation = self
            .parent(node)
            .map(|p| self.world_rotation_of(p))
            .unwrap_or(Quat::IDENTITY);
        self.set_local_rotation(node, parent_rotation.inverse() * rotation);
    }

    fn world_rotation_of(&self, node: NodeId) -> Quat {
        let Some(n) = self.nodes.get(node.0) else {
            return Quat::IDENTITY;
        };
        match n.parent {
            Some(parent) => self.world_rotation_of(parent) * n.local_rotation,
            None => n.local_rotation,
        }
    }
}

impl Rig for SceneRig {
    type Bone = NodeId;
    type Mesh = MeshId;

    fn set_blend_shape_weight(&mut self, mesh: MeshId, index: usize, weight: f32) {
        if let Some(slot) = self.meshes.get_mut(mesh.0).and_then(|m| m.get_mut(index)) {
            *slot = weight;
            self.mutations += 1;
        }
    }

    fn world_rotation(&self, bone: NodeId) -> Quat {
        self.world_rotation_of(bone)
    }

    fn local_rotation(&self, bone: NodeId) -> Quat {
        self.nodes
            .get(bone.0)
            .map(|n| n.local_rotation)
            .unwrap_or(Quat::IDENTITY)
    }

    fn set_local_rotation(&mut self, bone: NodeId, rotation: Quat) {
        if let Some(n) = self.nodes.get_mut(bone.0) {
            n.local_rotation = rotation;
            self.mutations += 1;
        }
    }

    fn local_position(&self, bone: NodeId) -> Vec3 {
        self.nodes
            .get(bone.0)
            .map(|n| n.local_position)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_local_position(&mut self, bone: NodeId, position: Vec3) {
        if let Some(n) = self.nodes.get_mut(bone.0) {
            n.local_position = position;
            self.mutations += 1;
        }
    }

    fn look_at(&mut self, bone: NodeId, target: Vec3, up: Vec3) {
        let forward = target - self.world_position(bone);
        self.set_world_rotation(bone, Quat::look_rotation(forward, up));
    }

    fn transform_point(&self, bone: NodeId, local: Vec3) -> Vec3 {
        self.world_position(bone) + self.world_rotation_of(bone) * local
    }

    fn create_anchor(&mut self, bone: NodeId) -> Option<NodeId> {
        let source = self.nodes.get(bone.0)?.clone();
        let parent_rotation = source
            .parent
            .map(|p| self.world_rotation_of(p))
            .unwrap_or(Quat::IDENTITY);

        let name = format!("{}GlobalRotationTarget", source.name);
        Some(self.add_node(
            &name,
            source.parent,
            source.local_position,
            parent_rotation.inverse(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_near(a: Vec3, b: Vec3) {
        assert!(a.distance(&b) < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_world_transform_chain() {
        let mut rig = SceneRig::new();
        let root = rig.add_node(
            "head",
            None,
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_euler_degrees(0.0, 90.0, 0.0),
        );
        let eye = rig.add_node("eye", Some(root), Vec3::new(0.0, 0.0, 1.0), Quat::IDENTITY);

        assert_vec_near(rig.world_position(eye), Vec3::new(1.0, 1.0, 0.0));
        assert_vec_near(rig.world_rotation(eye) * Vec3::FORWARD, Vec3::RIGHT);
        assert_vec_near(rig.transform_point(eye, Vec3::FORWARD), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_anchor_has_identity_world_rotation() {
        let mut rig = SceneRig::new();
        let root = rig.add_node(
            "head",
            None,
            Vec3::ZERO,
            Quat::from_euler_degrees(10.0, 20.0, 30.0),
        );
        let eye = rig.add_node(
            "eyeL",
            Some(root),
            Vec3::new(0.03, 0.05, 0.08),
            Quat::from_euler_degrees(0.0, 5.0, 0.0),
        );

        let anchor = rig.create_anchor(eye).unwrap();
        assert_eq!(rig.name(anchor), Some("eyeLGlobalRotationTarget"));
        assert_eq!(rig.parent(anchor), Some(root));
        assert_vec_near(rig.world_position(anchor), rig.world_position(eye));
        assert!(rig.world_rotation(anchor).angle_to(&Quat::IDENTITY) < 0.1);
        // Creating the anchor does not touch existing nodes
        assert_eq!(rig.mutation_count(), 0);
    }

    #[test]
    fn test_look_at() {
        let mut rig = SceneRig::new();
        let eye = rig.add_node("eye", None, Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
        rig.look_at(eye, Vec3::new(1.0, 0.0, -5.0), Vec3::UP);
        assert_vec_near(rig.world_rotation(eye) * Vec3::FORWARD, -Vec3::FORWARD);
    }

    #[test]
    fn test_blend_shape_bounds() {
        let mut rig = SceneRig::new();
        let mesh = rig.add_mesh(52);
        rig.set_blend_shape_weight(mesh, 3, 42.0);
        rig.set_blend_shape_weight(mesh, 52, 1.0);
        rig.set_blend_shape_weight(MeshId(7), 0, 1.0);

        assert_eq!(rig.blend_shape_weight(mesh, 3), Some(42.0));
        assert_eq!(rig.blend_shape_weight(mesh, 52), None);
        assert_eq!(rig.mutation_count(), 1);
    }
}
