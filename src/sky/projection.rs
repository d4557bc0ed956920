use glam::DVec3;

/// Wrap any degree value into (-180, 180]. The boundary maps to +180,
/// never -180.
#[inline(always)]
pub fn wrap_deg_180(d: f64) -> f64 {
    180.0 - (180.0 - d).rem_euclid(360.0)
}

/// Wrap any degree value into [0, 360).
#[inline(always)]
pub fn wrap_deg_360(d: f64) -> f64 {
    d.rem_euclid(360.0)
}

/// Convert RA/Dec (degrees) to a unit sphere vector.
/// Dec outside [-90, 90] is clamped on the way in.
#[inline(always)]
pub fn ra_dec_to_vec3(ra_deg: f64, dec_deg: f64) -> DVec3 {
    let ra = ra_deg.to_radians();
    let dec = dec_deg.clamp(-90.0, 90.0).to_radians();
    DVec3::new(ra.cos() * dec.cos(), dec.sin(), ra.sin() * dec.cos())
}

/// A point rotated into view space. `z` is depth toward the viewer;
/// only the near hemisphere (`z > 0`) is drawn.
#[derive(Clone, Copy, Debug)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visible: bool,
}

/// View orientation with the per-frame trig precomputed, so projecting a
/// vertex is a handful of multiplies. Yaw rotates about the vertical axis
/// first; pitch then rotates about the horizontal axis of the yaw-rotated
/// frame.
#[derive(Clone, Copy)]
pub struct SkyRotation {
    sin_yaw: f64,
    cos_yaw: f64,
    sin_pitch: f64,
    cos_pitch: f64,
}

impl SkyRotation {
    pub fn new(yaw_deg: f64, pitch_deg: f64) -> Self {
        let (sin_yaw, cos_yaw) = yaw_deg.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = pitch_deg.to_radians().sin_cos();
        Self {
            sin_yaw,
            cos_yaw,
            sin_pitch,
            cos_pitch,
        }
    }

    /// Rotate a unit-sphere point into view space.
    #[inline(always)]
    pub fn project(&self, p: DVec3) -> Projected {
        // Yaw about the vertical axis; the rotated x-axis becomes depth.
        let depth = p.x * self.cos_yaw + p.z * self.sin_yaw;
        let x = p.z * self.cos_yaw - p.x * self.sin_yaw;
        // Pitch mixes the vertical axis with depth.
        let y = p.y * self.cos_pitch - depth * self.sin_pitch;
        let z = p.y * self.sin_pitch + depth * self.cos_pitch;
        Projected {
            x,
            y,
            z,
            visible: z > 0.0,
        }
    }
}

/// Project a single RA/Dec point for the given view angles.
pub fn project_ra_dec(ra_deg: f64, dec_deg: f64, yaw_deg: f64, pitch_deg: f64) -> Projected {
    SkyRotation::new(yaw_deg, pitch_deg).project(ra_dec_to_vec3(ra_deg, dec_deg))
}

/// RA/Dec at the nominal view center for the given view angles.
pub fn view_center_ra_dec(yaw_deg: f64, pitch_deg: f64) -> (f64, f64) {
    (wrap_deg_360(yaw_deg + 90.0), pitch_deg.clamp(-90.0, 90.0))
}

/// Inverse of `view_center_ra_dec`: the view angles that put (ra, dec) at
/// the nominal center. Used to navigate to a footprint.
pub fn center_to_view(ra_deg: f64, dec_deg: f64) -> (f64, f64) {
    (wrap_deg_180(ra_deg - 90.0), dec_deg.clamp(-90.0, 90.0))
}

/// Screen placement of the projected sphere: pixel center of the viewport
/// and the sphere radius in pixels at scale = 1. Recomputed on resize,
/// otherwise fixed for the frame.
#[derive(Clone, Copy)]
pub struct GlobeBackground {
    pub center_x: f64,
    pub center_y: f64,
    pub initial_radius: f64,
}

impl GlobeBackground {
    /// Derive from the canvas pixel size; the sphere fills ~90% of the
    /// smaller dimension at scale = 1.
    pub fn from_canvas(width: usize, height: usize) -> Self {
        let w = width as f64;
        let h = height as f64;
        Self {
            center_x: w / 2.0,
            center_y: h / 2.0,
            initial_radius: (w.min(h) * 0.45).max(1.0),
        }
    }

    /// Sphere radius in pixels at the given zoom scale.
    #[inline(always)]
    pub fn radius_px(&self, scale: f64) -> f64 {
        scale * self.initial_radius
    }

    /// Map a view-space point to screen pixels. Both axes are negated:
    /// RA grows to screen-left (how the sky is read) and sphere-up is
    /// screen-up while pixel y grows downward.
    #[inline(always)]
    pub fn to_screen(&self, p: &Projected, scale: f64) -> (i32, i32) {
        let r = self.radius_px(scale);
        (
            (self.center_x - p.x * r) as i32,
            (self.center_y - p.y * r) as i32,
        )
    }
}
