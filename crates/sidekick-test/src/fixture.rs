//! Ready-made avatar rig

use sidekick_rig::{MeshId, NodeId, Quat, RigBindings, SceneRig, Vec3};

/// Head with two eyes and a set of blendshape meshes
pub struct Avatar {
    pub rig: SceneRig,
    pub head: NodeId,
    pub left_eye: NodeId,
    pub right_eye: NodeId,
    pub meshes: Vec<MeshId>,
}

impl Avatar {
    /// Avatar with `mesh_count` meshes of 52 channels each.
    ///
    /// The head sits slightly turned so eye world and local rotations
    /// differ.
    pub fn new(mesh_count: usize) -> Self {
        let mut rig = SceneRig::new();
        let head = rig.add_node(
            "Head",
            None,
            Vec3::new(0.0, 1.6, 0.0),
            Quat::from_euler_degrees(0.0, 15.0, 0.0),
        );
        let left_eye = rig.add_node(
            "LeftEye",
            Some(head),
            Vec3::new(-0.03, 0.07, 0.08),
            Quat::IDENTITY,
        );
        let right_eye = rig.add_node(
            "RightEye",
            Some(head),
            Vec3::new(0.03, 0.07, 0.08),
            Quat::IDENTITY,
        );
        let meshes = (0..mesh_count).map(|_| rig.add_mesh(52)).collect();

        Avatar {
            rig,
            head,
            left_eye,
            right_eye,
            meshes,
        }
    }

    pub fn bindings(&self) -> RigBindings<SceneRig> {
        RigBindings {
            meshes: self.meshes.clone(),
            left_eye: Some(self.left_eye),
            right_eye: Some(self.right_eye),
            head: Some(self.head),
        }
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new(2)
    }
}
