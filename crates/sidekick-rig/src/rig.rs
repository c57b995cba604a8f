//! Rig boundary
//!
//! Everything the applier needs from a host engine. Bones and meshes are
//! opaque handles owned by the host.

use std::fmt::Debug;

use crate::{Quat, Vec3};

pub trait Rig {
    /// Handle to a transform (bone or plain node)
    type Bone: Copy + Eq + Debug;
    /// Handle to a mesh carrying blendshapes
    type Mesh: Copy + Eq + Debug;

    fn set_blend_shape_weight(&mut self, mesh: Self::Mesh, index: usize, weight: f32);

    fn world_rotation(&self, bone: Self::Bone) -> Quat;

    fn local_rotation(&self, bone: Self::Bone) -> Quat;

    fn set_local_rotation(&mut self, bone: Self::Bone, rotation: Quat);

    fn local_position(&self, bone: Self::Bone) -> Vec3;

    fn set_local_position(&mut self, bone: Self::Bone, position: Vec3);

    /// Rotate `bone` so its forward axis points at `target` (world space)
    fn look_at(&mut self, bone: Self::Bone, target: Vec3, up: Vec3);

    /// Transform a point from `bone`'s local space into world space
    fn transform_point(&self, bone: Self::Bone, local: Vec3) -> Vec3;

    /// Create a node with the same parent and world position as `bone`
    /// and an identity world rotation.
    ///
    /// Returns `None` if the host cannot create nodes.
    fn create_anchor(&mut self, bone: Self::Bone) -> Option<Self::Bone>;

    /// World-space up axis of `bone`
    fn up(&self, bone: Self::Bone) -> Vec3 {
        self.world_rotation(bone) * Vec3::UP
    }
}
