//! The 3D surface view: wireframe, iso-value contour and axes.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use lyapviz_engine::{Session, SurfaceGrid};

use crate::contour::contour_segments;
use crate::projection::Projector;
use crate::theme::{Glyphs, Palette, colormap, styles};

/// Half-extent of the canvas; the unit cube's diagonal fits inside.
const CANVAS_EXTENT: f64 = 1.8;

/// Grid lines drawn per direction at most.
const MAX_WIRES: usize = 40;

/// One projected segment ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WireSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub depth: f64,
    pub color: Color,
}

/// Wireframe segments of `surface`, far ones first.
pub(crate) fn wireframe(surface: &SurfaceGrid, projector: &Projector) -> Vec<WireSegment> {
    let n = surface.size();
    let axis = surface.axis();
    let stride = n.div_ceil(MAX_WIRES).max(1);
    let range = surface.range();
    let kind = surface.kind();

    let mut segments = Vec::new();
    let mut push = |(r0, c0): (usize, usize), (r1, c1): (usize, usize)| {
        let z0 = surface.value(r0, c0);
        let z1 = surface.value(r1, c1);
        if !z0.is_finite() || !z1.is_finite() {
            return;
        }
        let a = projector.project(axis[c0], axis[r0], z0);
        let b = projector.project(axis[c1], axis[r1], z1);
        segments.push(WireSegment {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            depth: (a.depth + b.depth) / 2.0,
            color: colormap(kind, range.fraction((z0 + z1) / 2.0)),
        });
    };

    let mut lines: Vec<usize> = (0..n).step_by(stride).collect();
    if lines.last() != Some(&(n.saturating_sub(1))) && n > 0 {
        lines.push(n - 1);
    }
    for &fixed in &lines {
        for i in 0..n.saturating_sub(1) {
            push((fixed, i), (fixed, i + 1));
            push((i, fixed), (i + 1, fixed));
        }
    }
    segments.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    segments
}

/// Red iso-line at the slice value, drawn at height `z = slice`.
pub(crate) fn slice_contour(
    surface: &SurfaceGrid,
    projector: &Projector,
    slice: f64,
    color: Color,
) -> Vec<WireSegment> {
    contour_segments(surface, slice)
        .into_iter()
        .map(|[(ax, ay), (bx, by)]| {
            let a = projector.project(ax, ay, slice);
            let b = projector.project(bx, by, slice);
            WireSegment {
                x1: a.x,
                y1: a.y,
                x2: b.x,
                y2: b.y,
                depth: (a.depth + b.depth) / 2.0,
                color,
            }
        })
        .collect()
}

pub(crate) fn draw_plot(
    frame: &mut Frame,
    session: &Session,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let surface = session.surface();
    let state = session.state();
    let projector = Projector::new(state.camera, surface.limit(), surface.range());

    let wires = wireframe(surface, &projector);
    let contour = slice_contour(surface, &projector, state.slice, palette.contour);

    let [first, second] = session.vars().names();
    let origin = [-1.0, -1.0, -1.0];
    let axes = [
        ([1.0, -1.0, -1.0], first.to_string()),
        ([-1.0, 1.0, -1.0], second.to_string()),
        ([-1.0, -1.0, 1.0], "Value".to_string()),
    ];
    let base = projector.project_normalized(origin);
    let axis_style = Style::default().fg(palette.text_secondary);
    let muted = palette.bg_border;

    let title = Line::from(vec![
        Span::raw(" "),
        Span::styled(state.surface.label(), styles::panel_title(palette)),
        Span::raw(" "),
    ]);
    let camera_text = format!(
        " elev {:.0} {} azim {:.0} ",
        state.camera.elevation(),
        glyphs.separator,
        state.camera.azimuth()
    );
    let block = Block::default()
        .title(title)
        .title_bottom(Line::styled(camera_text, Style::default().fg(palette.text_muted)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_dark));

    let canvas = Canvas::default()
        .block(block)
        .marker(glyphs.marker)
        .background_color(palette.bg_dark)
        .x_bounds([-CANVAS_EXTENT, CANVAS_EXTENT])
        .y_bounds([-CANVAS_EXTENT, CANVAS_EXTENT])
        .paint(|ctx| {
            for (end, _) in &axes {
                let tip = projector.project_normalized(*end);
                ctx.draw(&CanvasLine::new(base.x, base.y, tip.x, tip.y, muted));
            }
            for w in &wires {
                ctx.draw(&CanvasLine::new(w.x1, w.y1, w.x2, w.y2, w.color));
            }
            // Contour layer sits above the wireframe.
            ctx.layer();
            for c in &contour {
                ctx.draw(&CanvasLine::new(c.x1, c.y1, c.x2, c.y2, c.color));
            }
            for (end, label) in &axes {
                let tip = projector.project_normalized(*end);
                ctx.print(
                    tip.x,
                    tip.y,
                    Line::styled(label.clone(), axis_style.add_modifier(Modifier::BOLD)),
                );
            }
        });
    frame.render_widget(canvas, area);
}
