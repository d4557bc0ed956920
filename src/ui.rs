use crate::app::App;
use crate::sky::renderer::SkyLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Split into globe area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_globe(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_globe(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Sky Atlas ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Footprints drawn fresh from the current view state
    let layers = app.render_layers(inner.width as usize, inner.height as usize);

    // Tooltip: hovered footprint id next to the pointer
    let tooltip = match (&app.interaction.hovered_id, app.interaction.hover_pos) {
        (Some(id), Some((px, py))) => {
            let cx = (px / 2) as u16;
            let cy = (py / 4) as u16;
            if cx < inner.width && cy < inner.height {
                Some((cx.saturating_add(2), cy, id.clone()))
            } else {
                None
            }
        }
        _ => None,
    };

    // Pointer marker position in character cells
    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    let widget = GlobeWidget {
        layers,
        cursor_pos,
        grabbing: app.controller.is_dragging(),
        tooltip,
    };
    frame.render_widget(widget, inner);
}

/// Custom widget that paints the braille layers back to front, then the
/// tooltip and pointer marker on top.
struct GlobeWidget {
    layers: SkyLayers,
    cursor_pos: Option<(u16, u16)>,
    grabbing: bool,
    tooltip: Option<(u16, u16, String)>,
}

impl GlobeWidget {
    /// Render one braille canvas layer with a specific color
    fn render_layer(
        &self,
        canvas: &crate::braille::BrailleCanvas,
        color: Color,
        area: Rect,
        buf: &mut Buffer,
    ) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: graticule, normal, hovered, selected
        self.render_layer(&self.layers.grid, Color::DarkGray, area, buf);
        self.render_layer(&self.layers.normal, Color::Cyan, area, buf);
        self.render_layer(&self.layers.hovered, Color::Yellow, area, buf);
        self.render_layer(&self.layers.selected, Color::LightMagenta, area, buf);

        // Tooltip text
        if let Some((tx, ty, text)) = &self.tooltip {
            let style = Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD);
            let max_len = (area.width.saturating_sub(*tx)) as usize;
            let display: String = text.chars().take(max_len.min(24)).collect();
            for (i, ch) in display.chars().enumerate() {
                let x = area.x + tx + i as u16;
                let y = area.y + ty;
                if x < area.x + area.width && y < area.y + area.height {
                    buf[(x, y)].set_char(ch).set_style(style);
                }
            }
        }

        // Pointer marker; heavier glyph while grabbing
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                let glyph = if self.grabbing { '╋' } else { '┼' };
                buf[(x, y)].set_char(glyph).set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &mut App, area: Rect) {
    let visible = app.renderer.visible_count();
    let total = app.footprints.len();

    let hovered = app
        .hovered_footprint()
        .map(|f| f.id.clone())
        .unwrap_or_else(|| "-".to_string());
    let selected = app
        .selected_footprint()
        .map(|f| {
            match f.meta.get("survey").and_then(|v| v.as_str()) {
                Some(kind) => format!("{} ({kind})", f.id),
                None => f.id.clone(),
            }
        })
        .unwrap_or_else(|| "-".to_string());

    let status = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(
            app.view_readout().to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{visible}/{total} fields"),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(" | hover: ", Style::default().fg(Color::DarkGray)),
        Span::styled(hovered, Style::default().fg(Color::Yellow)),
        Span::styled(" | sel: ", Style::default().fg(Color::DarkGray)),
        Span::styled(selected, Style::default().fg(Color::LightMagenta)),
        Span::styled(
            " | drag:pan wheel:zoom tab:next g:goto G:grid r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}
