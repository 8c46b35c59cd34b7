//! TUI rendering for lyapviz using ratatui.
//!
//! [`draw`] is a pure function of the [`Session`]: the whole frame is rebuilt
//! from state on every redraw.

mod contour;
mod input;
mod plot;
mod projection;
mod theme;

pub use contour::{Segment, contour_segments};
pub use input::{ROTATE_STEP, SLICE_PAGE_STEP, SLICE_STEP, apply_event, handle_events, handle_key};
pub use projection::{Projected, Projector};
pub use theme::{Glyphs, Palette, colormap, glyphs, palette, styles};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use lyapviz_engine::{CameraPreset, InputMode, Session, SurfaceKind};
use lyapviz_types::ui::format_slice_value;

const LEFT_PANEL_WIDTH: u16 = 26;
const Z_VALUE_WIDTH: u16 = 24;

/// Main draw function
pub fn draw(frame: &mut Frame, session: &Session) {
    let options = session.options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Controls + plot
            Constraint::Length(3), // Z value entry
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LEFT_PANEL_WIDTH), Constraint::Min(10)])
        .split(rows[0]);

    draw_controls(frame, session, main[0], &palette, &glyphs);
    plot::draw_plot(frame, session, main[1], &palette, &glyphs);
    draw_slice_entry(frame, session, rows[1], &palette);
    draw_status_bar(frame, session, rows[2], &palette);
}

fn panel_block(title: &str, palette: &Palette, focused: bool) -> Block<'static> {
    let border = if focused {
        palette.accent
    } else {
        palette.bg_border
    };
    Block::default()
        .title(Span::styled(format!(" {title} "), styles::panel_title(palette)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(palette.bg_panel))
}

fn draw_controls(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(CameraPreset::ALL.len() as u16 + 2),
            Constraint::Length(SurfaceKind::ALL.len() as u16 + 2),
            Constraint::Min(4),
        ])
        .split(area);

    draw_camera_buttons(frame, session, sections[0], palette, glyphs);
    draw_surface_selector(frame, session, sections[1], palette, glyphs);
    draw_slice_gauge(frame, session, sections[2], palette, glyphs);
}

fn draw_camera_buttons(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let active = session.camera().preset();
    let lines: Vec<Line> = CameraPreset::ALL
        .into_iter()
        .enumerate()
        .map(|(i, preset)| {
            let selected = active == Some(preset);
            let marker = if selected { glyphs.selected } else { " " };
            let style = if selected {
                styles::button_active(palette)
            } else {
                styles::button(palette)
            };
            Line::from(vec![
                Span::styled(format!("{marker}{} ", i + 1), styles::key_highlight(palette)),
                Span::styled(format!(" {} ", preset.label(session.vars())), style),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(panel_block("View", palette, false)),
        area,
    );
}

fn draw_surface_selector(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let current = session.state().surface;
    let lines: Vec<Line> = SurfaceKind::ALL
        .into_iter()
        .map(|kind| {
            let selected = kind == current;
            let (radio, style) = if selected {
                (
                    glyphs.radio_on,
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (glyphs.radio_off, Style::default().fg(palette.text_secondary))
            };
            Line::from(Span::styled(format!(" {radio} {}", kind.label()), style))
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(panel_block("Surface", palette, false)),
        area,
    );
}

/// Vertical slider: max at the top, min at the bottom, thumb at the slice.
pub(crate) fn gauge_lines(
    height: usize,
    fraction: f64,
    min_label: &str,
    max_label: &str,
    value_label: &str,
    glyphs: &Glyphs,
) -> Vec<(String, bool)> {
    if height == 0 {
        return Vec::new();
    }
    let last = height - 1;
    let thumb = ((1.0 - fraction.clamp(0.0, 1.0)) * last as f64).round() as usize;
    (0..height)
        .map(|row| {
            let glyph = match row.cmp(&thumb) {
                std::cmp::Ordering::Less => glyphs.track,
                std::cmp::Ordering::Equal => glyphs.thumb,
                std::cmp::Ordering::Greater => glyphs.fill,
            };
            let label = if row == thumb {
                value_label
            } else if row == 0 {
                max_label
            } else if row == last {
                min_label
            } else {
                ""
            };
            (format!(" {glyph} {label}"), row == thumb)
        })
        .collect()
}

fn draw_slice_gauge(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = panel_block("Z-slice", palette, false);
    let inner = block.inner(area);
    let range = session.range();
    let rows = gauge_lines(
        inner.height as usize,
        range.fraction(session.slice_value()),
        &format_slice_value(range.min()),
        &format_slice_value(range.max()),
        &format_slice_value(session.slice_value()),
        glyphs,
    );
    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(text, is_thumb)| {
            let style = if is_thumb {
                Style::default()
                    .fg(palette.yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text_muted)
            };
            Line::styled(text, style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_slice_entry(frame: &mut Frame, session: &Session, area: Rect, palette: &Palette) {
    let editing = session.input_mode() == InputMode::SliceEntry;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(Z_VALUE_WIDTH), Constraint::Min(0)])
        .split(area);

    let text = session.slice_text();
    let block = panel_block("Z value", palette, editing);
    let inner = block.inner(cols[0]);
    let style = if editing {
        Style::default().fg(palette.text_primary)
    } else {
        Style::default().fg(palette.text_secondary)
    };
    frame.render_widget(
        Paragraph::new(Line::styled(format!(" {text}"), style)).block(block),
        cols[0],
    );
    if editing {
        let offset = u16::try_from(text.chars().count() + 1).unwrap_or(u16::MAX);
        let x = inner.x.saturating_add(offset).min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }

    let verdict = if session.status().is_empty() {
        Line::default()
    } else {
        Line::styled(
            format!(" {}", session.status()),
            Style::default().fg(palette.text_secondary),
        )
    };
    frame.render_widget(
        Paragraph::new(verdict).block(panel_block("Verdict", palette, false)),
        cols[1],
    );
}

pub(crate) fn draw_status_bar(frame: &mut Frame, session: &Session, area: Rect, palette: &Palette) {
    let (mode_label, mode_style) = match session.input_mode() {
        InputMode::Normal => ("VIEW", styles::mode_normal(palette)),
        InputMode::SliceEntry => ("EDIT", styles::mode_insert(palette)),
    };

    let key = |k: &'static str| Span::styled(k, styles::key_highlight(palette));
    let hint = |h: &'static str| Span::styled(h, styles::key_hint(palette));
    let mut spans = vec![Span::styled(format!(" {mode_label} "), mode_style), Span::raw(" ")];
    match session.input_mode() {
        InputMode::Normal => spans.extend([
            key("Up/Dn"),
            hint(" slice  "),
            key("Enter"),
            hint(" type  "),
            key("Tab"),
            hint(" surface  "),
            key("1-3"),
            hint(" view  "),
            key("Lt/Rt"),
            hint(" rotate  "),
            key("r"),
            hint(" reset  "),
            key("q"),
            hint(" quit"),
        ]),
        InputMode::SliceEntry => spans.extend([
            key("Enter"),
            hint(" apply  "),
            key("Esc"),
            hint(" cancel"),
        ]),
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use lyapviz_engine::UiOptions;

    use super::gauge_lines;
    use crate::theme::glyphs;

    #[test]
    fn gauge_puts_thumb_at_fraction() {
        let g = glyphs(UiOptions {
            ascii_only: true,
            high_contrast: false,
        });
        let rows = gauge_lines(5, 0.5, "0.000", "18.000", "9.000", &g);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].0, " | 18.000");
        assert_eq!(rows[2], (" = 9.000".to_string(), true));
        assert_eq!(rows[4].0, " # 0.000");
    }

    #[test]
    fn gauge_thumb_at_extremes() {
        let g = glyphs(UiOptions::default());
        let top = gauge_lines(4, 1.0, "lo", "hi", "v", &g);
        assert!(top[0].1);
        let bottom = gauge_lines(4, 0.0, "lo", "hi", "v", &g);
        assert!(bottom[3].1);
        assert!(gauge_lines(0, 0.5, "lo", "hi", "v", &g).is_empty());
    }
}
