use parking_lot::Mutex;
use tracing::debug;

/// Snapshot of the current volume level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeState {
    pub current: i32,
    pub max: i32,
}

struct VolumeInner {
    current: i32,
    /// Level to restore when mute is toggled off
    pre_mute: Option<i32>,
}

/// Process-wide volume level with clamped mutations.
///
/// Every mutation clamps into `[0, max]` and is last-writer-wins; there are
/// no multi-step transactions. Mute is a toggle that remembers the pre-mute
/// level and restores it.
pub struct VolumeControl {
    inner: Mutex<VolumeInner>,
    max: i32,
}

impl VolumeControl {
    pub fn new(max: i32, initial: i32) -> Self {
        let max = max.max(0);
        Self {
            inner: Mutex::new(VolumeInner {
                current: initial.clamp(0, max),
                pre_mute: None,
            }),
            max,
        }
    }

    /// Raise the volume one step
    pub fn up(&self) -> VolumeState {
        self.adjust(1)
    }

    /// Lower the volume one step
    pub fn down(&self) -> VolumeState {
        self.adjust(-1)
    }

    fn adjust(&self, delta: i32) -> VolumeState {
        let mut inner = self.inner.lock();
        inner.current = (inner.current + delta).clamp(0, self.max);
        // Manual adjustment cancels a pending unmute restore
        inner.pre_mute = None;
        debug!("Volume adjusted to {}/{}", inner.current, self.max);
        VolumeState {
            current: inner.current,
            max: self.max,
        }
    }

    /// Toggle mute: drop to zero remembering the level, or restore it
    pub fn toggle_mute(&self) -> VolumeState {
        let mut inner = self.inner.lock();
        match inner.pre_mute.take() {
            Some(level) => {
                inner.current = level.clamp(0, self.max);
                debug!("Unmuted, restored volume {}/{}", inner.current, self.max);
            }
            None => {
                inner.pre_mute = Some(inner.current);
                inner.current = 0;
                debug!("Muted");
            }
        }
        VolumeState {
            current: inner.current,
            max: self.max,
        }
    }

    /// Set an absolute level, clamped into `[0, max]`
    pub fn set(&self, level: i32) -> VolumeState {
        let mut inner = self.inner.lock();
        inner.current = level.clamp(0, self.max);
        inner.pre_mute = None;
        debug!("Volume set to {}/{}", inner.current, self.max);
        VolumeState {
            current: inner.current,
            max: self.max,
        }
    }

    pub fn state(&self) -> VolumeState {
        let inner = self.inner.lock();
        VolumeState {
            current: inner.current,
            max: self.max,
        }
    }

    pub fn max(&self) -> i32 {
        self.max
    }
}
