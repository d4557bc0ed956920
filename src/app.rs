use crate::sky::projection::view_center_ra_dec;
use crate::sky::renderer::SkyLayers;
use crate::sky::{Footprint, FootprintRenderer, GlobeBackground, ViewportController, ViewStore};

/// One wheel step reported by the terminal, in conventional wheel units.
const WHEEL_NOTCH: f64 = 120.0;

/// Hover and selection state shared with the surrounding chrome: which
/// footprint the pointer is over (and where), and which one is selected.
#[derive(Default)]
pub struct InteractionState {
    pub hovered_id: Option<String>,
    pub hover_pos: Option<(i32, i32)>,
    pub selected_id: Option<String>,
}

/// A mouse press being tracked to tell clicks from drags. A press that
/// travels more than one cell before release is a drag, not a click.
struct Press {
    start: (u16, u16),
    dragged: bool,
}

/// Application state
pub struct App {
    pub store: ViewStore,
    pub controller: ViewportController,
    pub renderer: FootprintRenderer,
    pub footprints: Vec<Footprint>,
    pub interaction: InteractionState,
    pub background: GlobeBackground,
    pub should_quit: bool,
    /// Canvas size in braille pixels.
    pixel_width: usize,
    pixel_height: usize,
    /// Current pointer position in terminal cells, for the cursor marker.
    pub mouse_pos: Option<(u16, u16)>,
    press: Option<Press>,
    view_readout: String,
    readout_generation: Option<u64>,
}

impl App {
    pub fn new(term_width: usize, term_height: usize) -> Self {
        let mut app = Self {
            store: ViewStore::new(),
            controller: ViewportController::new(),
            renderer: FootprintRenderer::new(),
            footprints: Vec::new(),
            interaction: InteractionState::default(),
            background: GlobeBackground::from_canvas(2, 4),
            should_quit: false,
            pixel_width: 0,
            pixel_height: 0,
            mouse_pos: None,
            press: None,
            view_readout: String::new(),
            readout_generation: None,
        };
        app.resize(term_width, term_height);
        app
    }

    /// Update the canvas size when the terminal resizes.
    /// Braille gives 2x4 resolution per character; account for the border
    /// (2 cells) and the status bar (1 cell).
    pub fn resize(&mut self, term_width: usize, term_height: usize) {
        let inner_width = term_width.saturating_sub(2).max(1);
        let inner_height = term_height.saturating_sub(3).max(1);
        self.set_canvas_size(inner_width * 2, inner_height * 4);
    }

    /// Set the canvas pixel size directly, recomputing the globe placement
    /// only when the size actually changed.
    pub fn set_canvas_size(&mut self, pixel_width: usize, pixel_height: usize) {
        if pixel_width != self.pixel_width || pixel_height != self.pixel_height {
            self.pixel_width = pixel_width;
            self.pixel_height = pixel_height;
            self.background = GlobeBackground::from_canvas(pixel_width, pixel_height);
        }
    }

    /// Replace the footprint catalog and reconcile render states; hover
    /// and selection referring to vanished ids are dropped.
    pub fn set_footprints(&mut self, footprints: Vec<Footprint>) {
        self.footprints = footprints;
        self.renderer.sync(&self.footprints);
        if let Some(id) = self.interaction.selected_id.clone() {
            if !self.footprints.iter().any(|f| f.id == id) {
                self.interaction.selected_id = None;
            }
        }
        if let Some(id) = self.interaction.hovered_id.clone() {
            if !self.footprints.iter().any(|f| f.id == id) {
                self.interaction.hovered_id = None;
                self.interaction.hover_pos = None;
            }
        }
    }

    /// Convert terminal cell coordinates to braille pixel coordinates,
    /// accounting for the one-cell border offset.
    fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
        (
            (col.saturating_sub(1) as i32) * 2,
            (row.saturating_sub(1) as i32) * 4,
        )
    }

    pub fn pointer_down(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.press = Some(Press {
            start: (col, row),
            dragged: false,
        });
        let (px, py) = Self::cell_to_pixel(col, row);
        self.controller.pointer_down(px as f64, py as f64);
    }

    pub fn pointer_drag(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        if let Some(press) = &mut self.press {
            let (sc, sr) = press.start;
            if col.abs_diff(sc) > 1 || row.abs_diff(sr) > 1 {
                press.dragged = true;
            }
        }
        // A panning pointer is not hovering.
        self.interaction.hovered_id = None;
        self.interaction.hover_pos = None;
        let (px, py) = Self::cell_to_pixel(col, row);
        self.controller
            .pointer_move(&mut self.store, px as f64, py as f64);
    }

    pub fn pointer_up(&mut self, col: u16, row: u16) {
        self.controller.pointer_up();
        if let Some(press) = self.press.take() {
            if !press.dragged {
                self.click_at(col, row);
            }
        }
    }

    /// Pointer motion with no button held: hover tracking. Reports the
    /// footprint under the pointer and the pointer position, or clears
    /// both when over empty sky.
    pub fn pointer_hover(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        if self.controller.is_dragging() {
            return;
        }
        let (px, py) = Self::cell_to_pixel(col, row);
        match self
            .renderer
            .hit_test(px, py, self.interaction.selected_id.as_deref())
        {
            Some(id) => {
                if self.interaction.hovered_id.as_deref() != Some(id) {
                    self.interaction.hovered_id = Some(id.to_string());
                }
                self.interaction.hover_pos = Some((px, py));
            }
            None => {
                self.interaction.hovered_id = None;
                self.interaction.hover_pos = None;
            }
        }
    }

    fn click_at(&mut self, col: u16, row: u16) {
        let (px, py) = Self::cell_to_pixel(col, row);
        if let Some(id) = self
            .renderer
            .hit_test(px, py, self.interaction.selected_id.as_deref())
        {
            // Clicking the selected footprint deselects it.
            if self.interaction.selected_id.as_deref() == Some(id) {
                self.interaction.selected_id = None;
            } else {
                self.interaction.selected_id = Some(id.to_string());
            }
        }
    }

    pub fn wheel_zoom_in(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.controller.wheel(&mut self.store, -WHEEL_NOTCH);
    }

    pub fn wheel_zoom_out(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.controller.wheel(&mut self.store, WHEEL_NOTCH);
    }

    /// Keyboard zoom reuses the wheel path.
    pub fn zoom_in(&mut self) {
        self.controller.wheel(&mut self.store, -WHEEL_NOTCH);
    }

    pub fn zoom_out(&mut self) {
        self.controller.wheel(&mut self.store, WHEEL_NOTCH);
    }

    /// Keyboard pan: a fixed pixel step through the same sensitivity
    /// rules as a drag. Cancels any animation or leftover inertia.
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        self.controller.reset();
        let s = self.store.get();
        self.store.set(
            s.yaw_deg + dx / s.scale,
            s.pitch_deg + dy / s.scale,
            s.scale,
        );
    }

    /// Animate to the selected footprint's center.
    pub fn go_to_selected(&mut self) {
        let Some(id) = self.interaction.selected_id.as_deref() else {
            return;
        };
        if let Some(center) = self
            .footprints
            .iter()
            .find(|f| f.id == id)
            .and_then(|f| f.center())
        {
            self.controller.go_to(center.ra, center.dec);
        }
    }

    /// Cycle selection through the catalog. `step` is +1 or -1.
    pub fn select_step(&mut self, step: isize) {
        if self.footprints.is_empty() {
            return;
        }
        let len = self.footprints.len() as isize;
        let next = match &self.interaction.selected_id {
            Some(id) => match self.footprints.iter().position(|f| &f.id == id) {
                Some(i) => (i as isize + step).rem_euclid(len),
                None => 0,
            },
            None => {
                if step >= 0 {
                    0
                } else {
                    len - 1
                }
            }
        };
        self.interaction.selected_id = Some(self.footprints[next as usize].id.clone());
    }

    pub fn clear_selection(&mut self) {
        self.interaction.selected_id = None;
    }

    pub fn reset_view(&mut self) {
        self.controller.reset();
        self.store.reset();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Advance the inertia/animation simulation. `frame_dt` is in display
    /// frames (1.0 at the nominal rate).
    pub fn tick(&mut self, frame_dt: f64) {
        self.controller.tick(&mut self.store, frame_dt);
    }

    /// Draw all footprints for this frame.
    pub fn render_layers(&mut self, char_width: usize, char_height: usize) -> SkyLayers {
        self.set_canvas_size(char_width * 2, char_height * 4);
        self.renderer.render(
            &self.footprints,
            char_width,
            char_height,
            self.store.get(),
            &self.background,
            self.interaction.hovered_id.as_deref(),
            self.interaction.selected_id.as_deref(),
        )
    }

    pub fn hovered_footprint(&self) -> Option<&Footprint> {
        let id = self.interaction.hovered_id.as_deref()?;
        self.footprints.iter().find(|f| f.id == id)
    }

    pub fn selected_footprint(&self) -> Option<&Footprint> {
        let id = self.interaction.selected_id.as_deref()?;
        self.footprints.iter().find(|f| f.id == id)
    }

    /// View-center readout for the status bar, rebuilt only when the view
    /// generation changes.
    pub fn view_readout(&mut self) -> &str {
        let generation = self.store.generation();
        if self.readout_generation != Some(generation) {
            let s = self.store.get();
            let (ra, dec) = view_center_ra_dec(s.yaw_deg, s.pitch_deg);
            self.view_readout = format!("RA {ra:.1}°  Dec {dec:+.1}°  zoom {:.1}x", s.scale);
            self.readout_generation = Some(generation);
        }
        &self.view_readout
    }

    /// Pointer position in braille pixels, for the cursor marker.
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos
            .map(|(col, row)| Self::cell_to_pixel(col, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sky::RaDec;

    fn quad(id: &str, ra_lo: f64, ra_hi: f64) -> Footprint {
        Footprint {
            id: id.to_string(),
            vertices: vec![
                RaDec { ra: ra_lo, dec: -5.0 },
                RaDec { ra: ra_hi, dec: -5.0 },
                RaDec { ra: ra_hi, dec: 5.0 },
                RaDec { ra: ra_lo, dec: 5.0 },
            ],
            meta: geojson::JsonObject::new(),
        }
    }

    /// App with a 200x200 pixel canvas: a centered quad (straddling RA 0,
    /// which faces the viewer by default) and one to its screen-left.
    fn app_with_two_fields() -> App {
        let mut app = App::new(102, 53);
        app.set_footprints(vec![quad("center", 355.0, 5.0), quad("east", 20.0, 30.0)]);
        app.render_layers(100, 50);
        app
    }

    #[test]
    fn test_click_toggles_selection() {
        let mut app = app_with_two_fields();
        // Cell (51, 26) maps to pixel (100, 100), the canvas center.
        app.pointer_down(51, 26);
        app.pointer_up(51, 26);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("center"));

        app.pointer_down(51, 26);
        app.pointer_up(51, 26);
        assert_eq!(app.interaction.selected_id, None);

        app.pointer_down(51, 26);
        app.pointer_up(51, 26);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("center"));
    }

    #[test]
    fn test_hover_does_not_disturb_selection() {
        let mut app = app_with_two_fields();
        app.pointer_down(51, 26);
        app.pointer_up(51, 26);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("center"));

        // The "east" quad projects left of center, around pixel x = 62.
        app.pointer_hover(32, 26);
        assert_eq!(app.interaction.hovered_id.as_deref(), Some("east"));
        assert_eq!(app.interaction.selected_id.as_deref(), Some("center"));

        // Empty sky clears hover and reports no position.
        app.pointer_hover(2, 2);
        assert_eq!(app.interaction.hovered_id, None);
        assert_eq!(app.interaction.hover_pos, None);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("center"));
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut app = app_with_two_fields();
        app.pointer_down(51, 26);
        app.pointer_drag(60, 26);
        app.pointer_up(60, 26);
        assert_eq!(app.interaction.selected_id, None);
        // And the drag actually panned.
        assert!(app.store.get().yaw_deg != 0.0);
    }

    #[test]
    fn test_select_step_cycles() {
        let mut app = app_with_two_fields();
        app.select_step(1);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("center"));
        app.select_step(1);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("east"));
        app.select_step(1);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("center"));
        app.select_step(-1);
        assert_eq!(app.interaction.selected_id.as_deref(), Some("east"));
    }

    #[test]
    fn test_catalog_swap_drops_stale_selection() {
        let mut app = app_with_two_fields();
        app.select_step(1);
        assert!(app.interaction.selected_id.is_some());
        app.set_footprints(vec![quad("other", 100.0, 110.0)]);
        assert_eq!(app.interaction.selected_id, None);
    }

    #[test]
    fn test_view_readout_tracks_generation() {
        let mut app = app_with_two_fields();
        let first = app.view_readout().to_string();
        assert!(first.contains("RA"));
        app.nudge(40.0, 0.0);
        let second = app.view_readout().to_string();
        assert_ne!(first, second);
    }
}
