//! Skeleton access for palette building
//!
//! The palette builder only needs two things from a skeleton: a way to turn
//! a joint name (or a previously cached index) into a handle, and the
//! current world matrix for that handle. [`SkeletonView`] captures exactly
//! that, so avatars owned elsewhere can be skinned without copying their
//! joint data. [`Skeleton`] is a ready-made flat implementation.

use glam::Mat4;
use hashbrown::HashMap;
use rigkit_shared::JointKey;

use crate::error::SkinError;

/// Opaque reference to a joint inside a [`SkeletonView`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JointHandle(u32);

impl JointHandle {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Stable numeric index, suitable for caching in a skin definition.
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Read-only view of an animated skeleton.
pub trait SkeletonView {
    /// Resolve a joint by name.
    fn resolve(&self, joint: &JointKey) -> Option<JointHandle>;

    /// Resolve a joint by its cached numeric index.
    fn joint(&self, index: u32) -> Option<JointHandle>;

    /// Identifier of a resolved joint. Used to confirm that a cached index
    /// still names the same joint in this skeleton.
    fn joint_key(&self, joint: JointHandle) -> Option<&JointKey>;

    /// Current world transform of a resolved joint.
    fn world_matrix(&self, joint: JointHandle) -> Mat4;
}

#[derive(Clone, Debug)]
struct SkeletonJoint {
    key: JointKey,
    world: Mat4,
}

/// Flat skeleton: joints addressed by insertion index, looked up by hashed key.
///
/// World matrices are set directly by the animation system; no hierarchy
/// is evaluated here.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    joints: Vec<SkeletonJoint>,
    by_key: HashMap<u32, u32>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a joint with its initial world transform.
    pub fn add_joint(
        &mut self,
        joint: impl Into<JointKey>,
        world: Mat4,
    ) -> Result<JointHandle, SkinError> {
        let key = joint.into();
        if self.find(&key).is_some() {
            return Err(SkinError::DuplicateJoint(key.name().to_string()));
        }

        let index = self.joints.len() as u32;
        // Keep the first joint on a hash collision; later ones are found by scan
        self.by_key.entry(key.key()).or_insert(index);
        self.joints.push(SkeletonJoint { key, world });
        Ok(JointHandle(index))
    }

    /// Replace the world transform of a joint.
    pub fn set_world_matrix(&mut self, joint: JointHandle, world: Mat4) -> Result<(), SkinError> {
        let entry = self
            .joints
            .get_mut(joint.0 as usize)
            .ok_or(SkinError::UnknownJoint(joint.0))?;
        entry.world = world;
        Ok(())
    }

    /// Index of a joint by name
    pub fn joint_index(&self, name: &str) -> Option<u32> {
        self.find(&JointKey::new(name)).map(JointHandle::index)
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    fn find(&self, key: &JointKey) -> Option<JointHandle> {
        if let Some(&index) = self.by_key.get(&key.key()) {
            if self.joints[index as usize].key.name() == key.name() {
                return Some(JointHandle(index));
            }
        }
        self.joints
            .iter()
            .position(|joint| joint.key.name() == key.name())
            .map(|index| JointHandle(index as u32))
    }
}

impl SkeletonView for Skeleton {
    fn resolve(&self, joint: &JointKey) -> Option<JointHandle> {
        self.find(joint)
    }

    fn joint(&self, index: u32) -> Option<JointHandle> {
        ((index as usize) < self.joints.len()).then_some(JointHandle(index))
    }

    fn joint_key(&self, joint: JointHandle) -> Option<&JointKey> {
        self.joints.get(joint.0 as usize).map(|entry| &entry.key)
    }

    fn world_matrix(&self, joint: JointHandle) -> Mat4 {
        self.joints
            .get(joint.0 as usize)
            .map(|entry| entry.world)
            .unwrap_or(Mat4::IDENTITY)
    }
}
