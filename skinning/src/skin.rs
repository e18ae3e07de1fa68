//! Skin definitions
//!
//! A [`SkinDefinition`] is created once when a rigged mesh is loaded. It owns
//! the joint names, the matching inverse bind matrices and a lazily filled
//! cache of resolved skeleton indices.

use glam::Mat4;
use rigkit_shared::{JointKey, MAX_JOINT_COUNT, SkinningConfig};
use tracing::debug;

use crate::error::SkinError;
use crate::skeleton::{JointHandle, SkeletonView};

/// Cached resolution state of one skin joint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JointSlot {
    /// Not looked up yet (or invalidated by a scrub)
    #[default]
    Unresolved,
    /// Resolved to a skeleton joint index
    ByIndex(u32),
}

/// Joint names and inverse bind matrices for one rigged mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct SkinDefinition {
    joint_names: Vec<JointKey>,
    inverse_bind_matrices: Vec<Mat4>,
    joint_slots: Vec<JointSlot>,
    max_joint_count: usize,
    fallback: JointKey,
    invalid_joints_scrubbed: bool,
    unresolved_reported: bool,
}

impl SkinDefinition {
    /// Create a skin from parallel joint-name and inverse-bind lists.
    pub fn new(
        joint_names: Vec<JointKey>,
        inverse_bind_matrices: Vec<Mat4>,
    ) -> Result<Self, SkinError> {
        if joint_names.is_empty() {
            return Err(SkinError::EmptySkin);
        }
        if joint_names.len() != inverse_bind_matrices.len() {
            return Err(SkinError::LengthMismatch {
                joints: joint_names.len(),
                matrices: inverse_bind_matrices.len(),
            });
        }

        let joint_slots = vec![JointSlot::Unresolved; joint_names.len()];
        Ok(Self {
            joint_names,
            inverse_bind_matrices,
            joint_slots,
            max_joint_count: MAX_JOINT_COUNT,
            fallback: JointKey::fallback(),
            invalid_joints_scrubbed: false,
            unresolved_reported: false,
        })
    }

    /// Lower the joint ceiling (clamped to [`MAX_JOINT_COUNT`]).
    pub fn with_max_joint_count(mut self, max_joint_count: usize) -> Self {
        self.max_joint_count = max_joint_count.clamp(1, MAX_JOINT_COUNT);
        self
    }

    /// Apply the joint ceiling and fallback joint from configuration.
    pub fn with_config(self, config: &SkinningConfig) -> Self {
        let mut skin = self.with_max_joint_count(config.max_joint_count);
        skin.fallback = JointKey::new(config.fallback_joint.as_str());
        skin
    }

    /// Number of joints that take part in skinning.
    ///
    /// Names past the joint ceiling are kept but never reach the palette.
    pub fn joint_count(&self) -> usize {
        self.joint_names.len().min(self.max_joint_count)
    }

    pub fn joint_names(&self) -> &[JointKey] {
        &self.joint_names
    }

    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind_matrices
    }

    pub fn joint_slots(&self) -> &[JointSlot] {
        &self.joint_slots
    }

    pub fn is_scrubbed(&self) -> bool {
        self.invalid_joints_scrubbed
    }

    /// Redirect joint names the skeleton cannot resolve to the fallback joint
    /// (`mPelvis` unless configured otherwise).
    ///
    /// Runs once per definition; later calls return 0 without touching the
    /// skeleton. Returns the number of names that were replaced.
    pub fn scrub_invalid_joints<S: SkeletonView + ?Sized>(&mut self, skeleton: &S) -> usize {
        let fallback = self.fallback.clone();
        self.scrub_invalid_joints_with(skeleton, &fallback)
    }

    /// [`scrub_invalid_joints`](Self::scrub_invalid_joints) with an explicit fallback joint.
    pub fn scrub_invalid_joints_with<S: SkeletonView + ?Sized>(
        &mut self,
        skeleton: &S,
        fallback: &JointKey,
    ) -> usize {
        if self.invalid_joints_scrubbed {
            return 0;
        }

        let mut repaired = 0;
        let mut first_invalid = None;
        for (name, slot) in self.joint_names.iter_mut().zip(&mut self.joint_slots) {
            if skeleton.resolve(name).is_none() {
                let invalid = std::mem::replace(name, fallback.clone());
                if first_invalid.is_none() {
                    first_invalid = Some(invalid);
                }
                *slot = JointSlot::Unresolved;
                repaired += 1;
            }
        }

        if let Some(first) = first_invalid {
            debug!(
                repaired,
                first = %first,
                fallback = %fallback,
                "Mesh rigged to invalid joints"
            );
        }

        self.invalid_joints_scrubbed = true;
        repaired
    }

    /// Resolve joint `index` against `skeleton`, filling the slot cache.
    pub(crate) fn resolve_joint<S: SkeletonView + ?Sized>(
        &mut self,
        index: usize,
        skeleton: &S,
    ) -> Option<JointHandle> {
        // A cached index is only valid for a skeleton that has the same joint there
        if let JointSlot::ByIndex(cached) = self.joint_slots[index] {
            if let Some(handle) = skeleton.joint(cached) {
                if skeleton.joint_key(handle) == Some(&self.joint_names[index]) {
                    return Some(handle);
                }
            }
        }

        let handle = skeleton.resolve(&self.joint_names[index]);
        self.joint_slots[index] = match handle {
            Some(handle) => JointSlot::ByIndex(handle.index()),
            None => JointSlot::Unresolved,
        };
        handle
    }

    /// Returns true the first time it is called, false afterwards.
    pub(crate) fn take_unresolved_report(&mut self) -> bool {
        !std::mem::replace(&mut self.unresolved_reported, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Skeleton;
    use std::sync::{Arc, Mutex};

    fn avatar() -> Skeleton {
        let mut skeleton = Skeleton::new();
        for name in ["mPelvis", "mTorso", "mChest"] {
            skeleton.add_joint(name, Mat4::IDENTITY).unwrap();
        }
        skeleton
    }

    fn skin(names: &[&str]) -> SkinDefinition {
        SkinDefinition::new(
            names.iter().map(|&name| JointKey::new(name)).collect(),
            vec![Mat4::IDENTITY; names.len()],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let err = SkinDefinition::new(vec![JointKey::new("mPelvis")], vec![]).unwrap_err();
        assert_eq!(err, SkinError::LengthMismatch { joints: 1, matrices: 0 });
    }

    #[test]
    fn test_rejects_empty_skin() {
        let err = SkinDefinition::new(vec![], vec![]).unwrap_err();
        assert_eq!(err, SkinError::EmptySkin);
    }

    #[test]
    fn test_joint_count_is_capped() {
        let names: Vec<String> = (0..MAX_JOINT_COUNT + 5).map(|i| format!("j{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let skin = skin(&refs);
        assert_eq!(skin.joint_names().len(), MAX_JOINT_COUNT + 5);
        assert_eq!(skin.joint_count(), MAX_JOINT_COUNT);
        assert_eq!(skin.with_max_joint_count(4).joint_count(), 4);
    }

    #[test]
    fn test_scrub_replaces_unknown_names() {
        let skeleton = avatar();
        let mut skin = skin(&["mChest", "mWing", "mTorso", "mTail"]);

        let repaired = skin.scrub_invalid_joints(&skeleton);

        assert_eq!(repaired, 2);
        assert!(skin.is_scrubbed());
        let names: Vec<&str> = skin.joint_names().iter().map(JointKey::name).collect();
        assert_eq!(names, ["mChest", "mPelvis", "mTorso", "mPelvis"]);
        assert!(
            skin.joint_names()
                .iter()
                .all(|name| skeleton.resolve(name).is_some())
        );
    }

    #[test]
    fn test_scrub_is_idempotent() {
        let skeleton = avatar();
        let mut skin = skin(&["mWing", "mChest"]);

        skin.scrub_invalid_joints(&skeleton);
        let after_first = skin.clone();

        // A different skeleton must not matter once scrubbed
        let empty = Skeleton::new();
        assert_eq!(skin.scrub_invalid_joints(&empty), 0);
        assert_eq!(skin, after_first);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a debug-level subscriber and return what it logged.
    fn captured_log(f: impl FnOnce()) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = log.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_scrub_logs_once_per_skin() {
        let skeleton = avatar();
        let mut skin = skin(&["mWing", "mTail", "mChest", "mHorn"]);

        let output = captured_log(|| {
            assert_eq!(skin.scrub_invalid_joints(&skeleton), 3);
            assert_eq!(skin.scrub_invalid_joints(&skeleton), 0);
        });

        assert_eq!(output.matches("Mesh rigged to invalid joints").count(), 1);
        assert!(output.contains("repaired=3"));
        assert!(output.contains("first=mWing"));
    }

    #[test]
    fn test_resolve_ignores_cache_from_other_skeleton() {
        let first = avatar();
        let mut second = Skeleton::new();
        second.add_joint("mChest", Mat4::IDENTITY).unwrap();
        second.add_joint("mPelvis", Mat4::IDENTITY).unwrap();
        let mut skin = skin(&["mChest"]);

        assert_eq!(skin.resolve_joint(0, &first).unwrap().index(), 2);
        // Index 2 does not exist in the second skeleton and index 0 is mChest there
        assert_eq!(skin.resolve_joint(0, &second).unwrap().index(), 0);
        assert_eq!(skin.joint_slots()[0], JointSlot::ByIndex(0));

        // Same index, different joint: the cache must not be trusted
        let mut third = Skeleton::new();
        third.add_joint("mPelvis", Mat4::IDENTITY).unwrap();
        third.add_joint("mChest", Mat4::IDENTITY).unwrap();
        assert_eq!(skin.resolve_joint(0, &third).unwrap().index(), 1);
    }

    #[test]
    fn test_scrub_with_custom_fallback() {
        let skeleton = avatar();
        let mut skin = skin(&["mWing"]);
        skin.scrub_invalid_joints_with(&skeleton, &JointKey::new("mTorso"));
        assert_eq!(skin.joint_names()[0].name(), "mTorso");
    }

    #[test]
    fn test_config_sets_ceiling_and_fallback() {
        let skeleton = avatar();
        let config = SkinningConfig {
            max_joint_count: 1,
            fallback_joint: "mChest".to_string(),
            ..SkinningConfig::default()
        };
        let mut skin = skin(&["mWing", "mTorso"]).with_config(&config);

        assert_eq!(skin.joint_count(), 1);
        assert_eq!(skin.scrub_invalid_joints(&skeleton), 1);
        assert_eq!(skin.joint_names()[0].name(), "mChest");
    }

    #[test]
    fn test_resolve_caches_index() {
        let skeleton = avatar();
        let mut skin = skin(&["mChest", "mPelvis"]);
        assert_eq!(skin.joint_slots()[0], JointSlot::Unresolved);

        let handle = skin.resolve_joint(0, &skeleton).unwrap();
        assert_eq!(handle.index(), 2);
        assert_eq!(skin.joint_slots()[0], JointSlot::ByIndex(2));
        assert_eq!(skin.joint_slots()[1], JointSlot::Unresolved);
    }

    #[test]
    fn test_unresolved_report_fires_once() {
        let mut skin = skin(&["mPelvis"]);
        assert!(skin.take_unresolved_report());
        assert!(!skin.take_unresolved_report());
    }
}
