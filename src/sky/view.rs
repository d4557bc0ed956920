use crate::sky::projection::wrap_deg_180;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 1000.0;
/// Pitch stops just short of the poles so the view never gimbal-locks.
pub const MAX_PITCH: f64 = 89.5;

/// Current view orientation and zoom. Always in range: yaw wrapped into
/// (-180, 180], pitch clamped to [-89.5, 89.5], scale clamped to
/// [MIN_SCALE, MAX_SCALE]. Values only enter through `ViewState::new`, so
/// no reader can observe an out-of-range state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub scale: f64,
}

impl ViewState {
    pub fn new(yaw_deg: f64, pitch_deg: f64, scale: f64) -> Self {
        Self {
            yaw_deg: wrap_deg_180(yaw_deg),
            pitch_deg: pitch_deg.clamp(-MAX_PITCH, MAX_PITCH),
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// Owner of the shared view state. The per-frame tick and render pass read
/// imperatively through `get`; UI readouts that only need to know "did it
/// change" compare `generation` stamps instead of recomputing every frame.
pub struct ViewStore {
    state: ViewState,
    generation: u64,
}

impl ViewStore {
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            generation: 0,
        }
    }

    /// Direct pull accessor for per-frame readers.
    #[inline(always)]
    pub fn get(&self) -> ViewState {
        self.state
    }

    /// Replace the state, wrapping and clamping on the way in. The
    /// generation stamp only advances when the stored value actually
    /// changes, so idle frames stay cheap for generation-watchers.
    pub fn set(&mut self, yaw_deg: f64, pitch_deg: f64, scale: f64) {
        let next = ViewState::new(yaw_deg, pitch_deg, scale);
        if next != self.state {
            self.state = next;
            self.generation = self.generation.wrapping_add(1);
        }
    }

    pub fn reset(&mut self) {
        let next = ViewState::default();
        if next != self.state {
            self.state = next;
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Change stamp for reactive consumers.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}
