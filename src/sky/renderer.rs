use std::collections::{HashMap, HashSet};

use glam::DVec3;

use crate::braille::BrailleCanvas;
use crate::sky::geometry::{
    draw_circle_outline, draw_line, draw_polygon, fill_polygon, point_in_polygon,
};
use crate::sky::projection::{ra_dec_to_vec3, wrap_deg_360, GlobeBackground, SkyRotation};
use crate::sky::view::ViewState;

/// A sky position in degrees: RA in [0, 360), Dec in [-90, 90].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaDec {
    pub ra: f64,
    pub dec: f64,
}

/// An observed sky region: a closed polygon of RA/Dec vertices plus the
/// free-form catalog properties it was loaded with. Owned by the data
/// layer; the renderer reads the list as a snapshot and diffs it by id.
#[derive(Clone, Debug)]
pub struct Footprint {
    pub id: String,
    pub vertices: Vec<RaDec>,
    pub meta: geojson::JsonObject,
}

impl Footprint {
    /// Mean direction of the vertices, for go-to navigation. `None` when
    /// the vertices cancel out or contain no finite data.
    pub fn center(&self) -> Option<RaDec> {
        let mut sum = DVec3::ZERO;
        for v in &self.vertices {
            if !v.ra.is_finite() || !v.dec.is_finite() {
                return None;
            }
            sum += ra_dec_to_vec3(v.ra, v.dec);
        }
        if sum.length() < 1e-9 {
            return None;
        }
        let c = sum.normalize();
        Some(RaDec {
            ra: wrap_deg_360(c.z.atan2(c.x).to_degrees()),
            dec: c.y.clamp(-1.0, 1.0).asin().to_degrees(),
        })
    }
}

/// Visual state of a footprint, lowest to highest z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FootprintStyle {
    Normal,
    Hovered,
    Selected,
}

/// Persistent per-footprint render state. Created when an id first appears
/// in the catalog, destroyed when it disappears, reused in between — never
/// rebuilt per frame. Unit-sphere vertices are computed once here; the
/// screen polygon doubles as the hit area and is refilled into the same
/// buffer every frame so it can never go stale after a pan or zoom.
struct RenderState {
    unit_verts: Vec<DVec3>,
    screen_poly: Vec<(i32, i32)>,
    degenerate: bool,
    visible: bool,
    style: FootprintStyle,
}

impl RenderState {
    fn new(fp: &Footprint) -> Self {
        let degenerate = fp.vertices.len() < 3
            || fp
                .vertices
                .iter()
                .any(|v| !v.ra.is_finite() || !v.dec.is_finite());
        let unit_verts = if degenerate {
            Vec::new()
        } else {
            fp.vertices
                .iter()
                .map(|v| ra_dec_to_vec3(v.ra, v.dec))
                .collect()
        };
        Self {
            unit_verts,
            screen_poly: Vec::new(),
            degenerate,
            visible: false,
            style: FootprintStyle::Normal,
        }
    }
}

/// Per-frame output canvases, painted back to front by the UI:
/// grid, then normal, hovered, selected.
pub struct SkyLayers {
    pub grid: BrailleCanvas,
    pub normal: BrailleCanvas,
    pub hovered: BrailleCanvas,
    pub selected: BrailleCanvas,
}

impl SkyLayers {
    fn new(char_width: usize, char_height: usize) -> Self {
        Self {
            grid: BrailleCanvas::new(char_width, char_height),
            normal: BrailleCanvas::new(char_width, char_height),
            hovered: BrailleCanvas::new(char_width, char_height),
            selected: BrailleCanvas::new(char_width, char_height),
        }
    }
}

/// Keeps a one-to-one mapping from footprint id to render state and
/// redraws every footprint from the current view each frame.
pub struct FootprintRenderer {
    states: HashMap<String, RenderState>,
    /// Catalog order: draw order within a layer and hit-test tiebreak.
    order: Vec<String>,
    pub show_grid: bool,
}

impl FootprintRenderer {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            order: Vec::new(),
            show_grid: true,
        }
    }

    /// Reconcile render states with a new catalog snapshot. Runs on
    /// catalog change only, not per frame: ids that vanished are
    /// destroyed, new ids get a freshly initialized state (unit vectors
    /// computed here, once), ids present in both are left untouched.
    pub fn sync(&mut self, footprints: &[Footprint]) {
        let ids: HashSet<&str> = footprints.iter().map(|f| f.id.as_str()).collect();
        self.states.retain(|id, _| ids.contains(id.as_str()));
        for fp in footprints {
            self.states
                .entry(fp.id.clone())
                .or_insert_with(|| RenderState::new(fp));
        }
        self.order = footprints.iter().map(|f| f.id.clone()).collect();
    }

    /// Project and draw every footprint for the current frame. A
    /// footprint with any vertex on the far hemisphere is hidden whole —
    /// there is no partial clipping — and a hidden footprint has an empty
    /// hit area. A footprint that is both hovered and selected draws as
    /// selected.
    pub fn render(
        &mut self,
        footprints: &[Footprint],
        char_width: usize,
        char_height: usize,
        view: ViewState,
        bg: &GlobeBackground,
        hovered: Option<&str>,
        selected: Option<&str>,
    ) -> SkyLayers {
        let mut layers = SkyLayers::new(char_width, char_height);
        let rot = SkyRotation::new(view.yaw_deg, view.pitch_deg);

        draw_circle_outline(
            &mut layers.grid,
            bg.center_x as i32,
            bg.center_y as i32,
            bg.radius_px(view.scale) as i32,
        );
        if self.show_grid {
            draw_graticule(&mut layers.grid, &rot, bg, view.scale);
        }

        for fp in footprints {
            let Some(state) = self.states.get_mut(&fp.id) else {
                continue;
            };
            state.visible = false;
            state.screen_poly.clear();
            if state.degenerate {
                continue;
            }

            let mut all_visible = true;
            for v in &state.unit_verts {
                let p = rot.project(*v);
                if !p.visible {
                    all_visible = false;
                    break;
                }
                state.screen_poly.push(bg.to_screen(&p, view.scale));
            }
            if !all_visible {
                state.screen_poly.clear();
                continue;
            }

            state.visible = true;
            state.style = if selected == Some(fp.id.as_str()) {
                FootprintStyle::Selected
            } else if hovered == Some(fp.id.as_str()) {
                FootprintStyle::Hovered
            } else {
                FootprintStyle::Normal
            };
            // The hit area stays live either way; skip only the drawing
            // when the polygon lies entirely off the canvas.
            if !bbox_overlaps_canvas(&state.screen_poly, char_width * 2, char_height * 4) {
                continue;
            }
            match state.style {
                FootprintStyle::Normal => draw_polygon(&mut layers.normal, &state.screen_poly),
                FootprintStyle::Hovered => {
                    fill_polygon(&mut layers.hovered, &state.screen_poly);
                    draw_polygon(&mut layers.hovered, &state.screen_poly);
                }
                FootprintStyle::Selected => draw_polygon(&mut layers.selected, &state.screen_poly),
            }
        }

        layers
    }

    /// Pick the footprint under a screen pixel using the hit areas from
    /// the last render. The selected footprint sits on the top layer and
    /// wins outright; otherwise the topmost (last drawn) match wins.
    pub fn hit_test(&self, px: i32, py: i32, selected: Option<&str>) -> Option<&str> {
        let mut hit = None;
        for id in &self.order {
            let Some(state) = self.states.get(id) else {
                continue;
            };
            if state.visible && point_in_polygon(&state.screen_poly, px, py) {
                if selected == Some(id.as_str()) {
                    return Some(id.as_str());
                }
                hit = Some(id.as_str());
            }
        }
        hit
    }

    /// Whether the footprint drew (and is hit-testable) this frame.
    pub fn is_visible(&self, id: &str) -> bool {
        self.states.get(id).is_some_and(|s| s.visible)
    }

    pub fn style_of(&self, id: &str) -> Option<FootprintStyle> {
        self.states.get(id).map(|s| s.style)
    }

    pub fn visible_count(&self) -> usize {
        self.states.values().filter(|s| s.visible).count()
    }

    #[cfg(test)]
    fn has_state(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }
}

impl Default for FootprintRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rough bounding-box check against the canvas, so fully off-screen
/// polygons cost nothing to draw.
fn bbox_overlaps_canvas(pts: &[(i32, i32)], pixel_width: usize, pixel_height: usize) -> bool {
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    let mut min_y = i32::MAX;
    let mut max_y = i32::MIN;
    for &(x, y) in pts {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    max_x >= 0 && min_x < pixel_width as i32 && max_y >= 0 && min_y < pixel_height as i32
}

/// Sample meridians and parallels every 30 degrees, culled per sample
/// point like any other geometry; segments bridging the horizon are
/// simply broken.
fn draw_graticule(canvas: &mut BrailleCanvas, rot: &SkyRotation, bg: &GlobeBackground, scale: f64) {
    for m in 0..12 {
        let ra = f64::from(m) * 30.0;
        let mut prev: Option<(i32, i32)> = None;
        for i in 0..=60 {
            let dec = -90.0 + f64::from(i) * 3.0;
            prev = plot_grid_point(canvas, rot, bg, scale, ra, dec, prev);
        }
    }
    for p in -2..=2 {
        let dec = f64::from(p) * 30.0;
        let mut prev: Option<(i32, i32)> = None;
        for i in 0..=120 {
            let ra = f64::from(i) * 3.0;
            prev = plot_grid_point(canvas, rot, bg, scale, ra, dec, prev);
        }
    }
}

fn plot_grid_point(
    canvas: &mut BrailleCanvas,
    rot: &SkyRotation,
    bg: &GlobeBackground,
    scale: f64,
    ra: f64,
    dec: f64,
    prev: Option<(i32, i32)>,
) -> Option<(i32, i32)> {
    let p = rot.project(ra_dec_to_vec3(ra, dec));
    if !p.visible {
        return None;
    }
    let pt = bg.to_screen(&p, scale);
    if let Some((px, py)) = prev {
        draw_line(canvas, px, py, pt.0, pt.1);
    }
    Some(pt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(id: &str, verts: &[(f64, f64)]) -> Footprint {
        Footprint {
            id: id.to_string(),
            vertices: verts.iter().map(|&(ra, dec)| RaDec { ra, dec }).collect(),
            meta: geojson::JsonObject::new(),
        }
    }

    /// A quad around the front of the default view (which has the RA=0
    /// meridian facing the viewer), crossing RA=0.
    fn front_quad(id: &str) -> Footprint {
        footprint(id, &[(355.0, -5.0), (5.0, -5.0), (5.0, 5.0), (355.0, 5.0)])
    }

    fn render_once(
        renderer: &mut FootprintRenderer,
        fps: &[Footprint],
        hovered: Option<&str>,
        selected: Option<&str>,
    ) -> (SkyLayers, GlobeBackground) {
        let bg = GlobeBackground::from_canvas(200, 200);
        let layers = renderer.render(fps, 100, 50, ViewState::default(), &bg, hovered, selected);
        (layers, bg)
    }

    #[test]
    fn test_sync_diffs_by_id() {
        let mut r = FootprintRenderer::new();
        let a = front_quad("a");
        let b = front_quad("b");
        r.sync(&[a.clone(), b.clone()]);
        assert!(r.has_state("a") && r.has_state("b"));

        let c = front_quad("c");
        r.sync(&[b.clone(), c]);
        assert!(!r.has_state("a"));
        assert!(r.has_state("b") && r.has_state("c"));
    }

    #[test]
    fn test_visible_footprint_is_hit_testable_at_center() {
        let mut r = FootprintRenderer::new();
        let fps = vec![front_quad("cosmos")];
        r.sync(&fps);
        let (_, bg) = render_once(&mut r, &fps, None, None);
        assert!(r.is_visible("cosmos"));
        let hit = r.hit_test(bg.center_x as i32, bg.center_y as i32, None);
        assert_eq!(hit, Some("cosmos"));
    }

    #[test]
    fn test_far_side_vertex_hides_whole_footprint() {
        // RA 100 is past the horizon of the default view; RA 80 is not.
        let mut r = FootprintRenderer::new();
        let fps = vec![footprint(
            "straddler",
            &[(80.0, -5.0), (100.0, -5.0), (100.0, 5.0), (80.0, 5.0)],
        )];
        r.sync(&fps);
        let (layers, bg) = render_once(&mut r, &fps, None, None);
        assert!(!r.is_visible("straddler"));
        // Not drawn and not hit-testable anywhere on screen.
        assert!(layers.normal.rows().all(|row| row.chars().all(|c| c == '⠀')));
        for px in (0..200).step_by(7) {
            for py in (0..200).step_by(7) {
                assert_eq!(r.hit_test(px, py, None), None);
            }
        }
        let _ = bg;
    }

    #[test]
    fn test_degenerate_footprints_are_skipped_not_fatal() {
        let mut r = FootprintRenderer::new();
        let fps = vec![
            footprint("two-verts", &[(0.0, 0.0), (10.0, 0.0)]),
            footprint("nan", &[(f64::NAN, 0.0), (10.0, 0.0), (10.0, 10.0)]),
            front_quad("good"),
        ];
        r.sync(&fps);
        let (_, bg) = render_once(&mut r, &fps, None, None);
        assert!(!r.is_visible("two-verts"));
        assert!(!r.is_visible("nan"));
        assert!(r.is_visible("good"));
        assert_eq!(
            r.hit_test(bg.center_x as i32, bg.center_y as i32, None),
            Some("good")
        );
    }

    #[test]
    fn test_selected_beats_hovered_styling() {
        let mut r = FootprintRenderer::new();
        let fps = vec![front_quad("field")];
        r.sync(&fps);
        render_once(&mut r, &fps, Some("field"), Some("field"));
        assert_eq!(r.style_of("field"), Some(FootprintStyle::Selected));
    }

    #[test]
    fn test_selected_wins_hit_test_over_overlap() {
        let mut r = FootprintRenderer::new();
        // Two quads covering the same screen region; "under" is drawn first.
        let fps = vec![front_quad("under"), front_quad("over")];
        r.sync(&fps);
        let (_, bg) = render_once(&mut r, &fps, None, Some("under"));
        let (cx, cy) = (bg.center_x as i32, bg.center_y as i32);
        assert_eq!(r.hit_test(cx, cy, Some("under")), Some("under"));
        // Without a selection the topmost (last drawn) wins.
        assert_eq!(r.hit_test(cx, cy, None), Some("over"));
    }

    #[test]
    fn test_hit_area_follows_the_view() {
        let mut r = FootprintRenderer::new();
        let fps = vec![front_quad("field")];
        r.sync(&fps);
        let bg = GlobeBackground::from_canvas(200, 200);
        let (cx, cy) = (bg.center_x as i32, bg.center_y as i32);

        r.render(&fps, 100, 50, ViewState::default(), &bg, None, None);
        assert_eq!(r.hit_test(cx, cy, None), Some("field"));

        // Pan 40 degrees: the old hit position must no longer match.
        r.render(&fps, 100, 50, ViewState::new(40.0, 0.0, 1.0), &bg, None, None);
        assert_eq!(r.hit_test(cx, cy, None), None);
    }

    #[test]
    fn test_footprint_center() {
        let c = front_quad("f").center().unwrap();
        assert!(c.ra < 1e-6 || c.ra > 359.999);
        assert!(c.dec.abs() < 1e-6);

        let none = footprint("bad", &[(f64::NAN, 0.0), (1.0, 1.0), (2.0, 2.0)]).center();
        assert!(none.is_none());
    }
}
