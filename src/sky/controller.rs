use crate::sky::projection::{center_to_view, wrap_deg_180};
use crate::sky::view::{ViewStore, MAX_PITCH};

pub const FRICTION: f64 = 0.90;
pub const STOP_THRESHOLD: f64 = 0.01;
pub const SENSITIVITY: f64 = 1.0;
pub const ZOOM_SENSITIVITY: f64 = 0.0015;

/// Fraction of the remaining distance a go-to animation covers per tick.
const GOTO_EASE: f64 = 0.18;
/// Angular distance at which a go-to animation snaps to its target.
const GOTO_SNAP_DEG: f64 = 0.05;

struct GotoTarget {
    yaw_deg: f64,
    pitch_deg: f64,
}

/// Turns pointer and wheel input into view-state changes and runs the
/// post-drag inertia each display frame. Two states: idle and dragging.
/// The controller is the only writer of the view store and of the drag
/// velocity.
pub struct ViewportController {
    dragging: bool,
    last_pointer: Option<(f64, f64)>,
    /// Screen-pixel-per-frame velocity left behind by the last drag.
    vx: f64,
    vy: f64,
    goto_target: Option<GotoTarget>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            dragging: false,
            last_pointer: None,
            vx: 0.0,
            vy: 0.0,
            goto_target: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_animating(&self) -> bool {
        self.goto_target.is_some()
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.vx, self.vy)
    }

    /// Begin a drag. Cancels any go-to animation and kills leftover
    /// inertia so the new gesture starts from rest.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.goto_target = None;
        self.vx = 0.0;
        self.vy = 0.0;
        self.last_pointer = Some((x, y));
        self.dragging = true;
    }

    /// Pan by the pointer delta while dragging; records the velocity that
    /// inertia will continue with after release.
    pub fn pointer_move(&mut self, store: &mut ViewStore, x: f64, y: f64) {
        if !self.dragging || !x.is_finite() || !y.is_finite() {
            return;
        }
        let Some((lx, ly)) = self.last_pointer else {
            self.last_pointer = Some((x, y));
            return;
        };
        let dx = x - lx;
        let dy = y - ly;
        let s = store.get();
        store.set(
            s.yaw_deg + dx * SENSITIVITY / s.scale,
            s.pitch_deg + dy * SENSITIVITY / s.scale,
            s.scale,
        );
        self.vx = -dx * SENSITIVITY;
        self.vy = -dy * SENSITIVITY;
        self.last_pointer = Some((x, y));
    }

    /// End a drag; the last recorded velocity carries the inertia.
    pub fn pointer_up(&mut self) {
        self.dragging = false;
        self.last_pointer = None;
    }

    /// Exponential wheel zoom. Cancels any go-to animation and inertia.
    pub fn wheel(&mut self, store: &mut ViewStore, delta_y: f64) {
        if !delta_y.is_finite() {
            return;
        }
        self.goto_target = None;
        self.vx = 0.0;
        self.vy = 0.0;
        let s = store.get();
        store.set(
            s.yaw_deg,
            s.pitch_deg,
            s.scale * (-ZOOM_SENSITIVITY * delta_y).exp(),
        );
    }

    /// Animate toward the view that centers (ra, dec).
    pub fn go_to(&mut self, ra_deg: f64, dec_deg: f64) {
        let (yaw, pitch) = center_to_view(ra_deg, dec_deg);
        self.vx = 0.0;
        self.vy = 0.0;
        self.goto_target = Some(GotoTarget {
            yaw_deg: yaw,
            pitch_deg: pitch.clamp(-MAX_PITCH, MAX_PITCH),
        });
    }

    /// Cancel any animation and inertia and end the drag.
    pub fn reset(&mut self) {
        self.dragging = false;
        self.last_pointer = None;
        self.vx = 0.0;
        self.vy = 0.0;
        self.goto_target = None;
    }

    /// Per-display-frame simulation step. `frame_dt` is in display frames
    /// (1.0 at the nominal frame rate), making the decay independent of
    /// the actual frame timing. Does nothing while dragging; does nothing
    /// once both velocity components are below STOP_THRESHOLD, so a
    /// resting view accumulates no float drift.
    pub fn tick(&mut self, store: &mut ViewStore, frame_dt: f64) {
        if self.dragging || !frame_dt.is_finite() || frame_dt <= 0.0 {
            return;
        }
        if self.step_goto(store, frame_dt) {
            return;
        }
        if self.vx.abs() < STOP_THRESHOLD && self.vy.abs() < STOP_THRESHOLD {
            return;
        }
        let s = store.get();
        let delta_yaw = self.vx / s.scale * frame_dt;
        let delta_pitch = self.vy / s.scale * frame_dt;
        store.set(s.yaw_deg - delta_yaw, s.pitch_deg - delta_pitch, s.scale);
        self.vx *= FRICTION;
        self.vy *= FRICTION;
    }

    fn step_goto(&mut self, store: &mut ViewStore, frame_dt: f64) -> bool {
        let Some(target) = &self.goto_target else {
            return false;
        };
        let s = store.get();
        let dyaw = wrap_deg_180(target.yaw_deg - s.yaw_deg);
        let dpitch = target.pitch_deg - s.pitch_deg;
        if dyaw.abs() < GOTO_SNAP_DEG && dpitch.abs() < GOTO_SNAP_DEG {
            store.set(target.yaw_deg, target.pitch_deg, s.scale);
            self.goto_target = None;
            return true;
        }
        let f = 1.0 - (1.0 - GOTO_EASE).powf(frame_dt);
        store.set(s.yaw_deg + dyaw * f, s.pitch_deg + dpitch * f, s.scale);
        true
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}
