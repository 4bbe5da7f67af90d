//! SVG rendering of a solved plan. The renderer draws the footprint,
//! the rooms with their labels, the corridor overlay, and every opening;
//! output is a standalone SVG document assembled as a string.

#[cfg(test)]
mod test;

use std::fmt::Write;

use clap::Args;

use crate::{
    geom::{Footprint, Rect},
    intent::RoomType,
    plan::{OpeningKind, PlacedOpening, PlanState},
    solver::score::PlanScore,
};

#[derive(Debug, Clone, Args)]
#[clap(next_help_heading = "Rendering options")]
pub struct RenderOptions {
    /// Pixels per meter.
    #[clap(long, default_value_t = 40.0)]
    pub scale: f64,

    /// Draw room labels with areas.
    #[clap(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub draw_labels: bool,

    /// Draw a one-meter reference grid over the footprint.
    #[clap(long)]
    pub draw_grid: bool,

    /// Draw the plan score in the corner.
    #[clap(long, short = 's')]
    pub draw_score: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            scale: 40.0,
            draw_labels: true,
            draw_grid: false,
            draw_score: false,
        }
    }
}

const MARGIN_PX: f64 = 20.0;
const WALL_COLOR: &str = "#333333";
const FLOOR_COLOR: &str = "#fbfaf8";
const WINDOW_COLOR: &str = "#7ab3d4";
const CORRIDOR_OVERLAY: &str = "#e8e0c9";

fn room_fill(kind: RoomType) -> &'static str {
    match kind {
        RoomType::Living | RoomType::Dining => "#f2e8d5",
        RoomType::Kitchen => "#e8d9c4",
        RoomType::Bedroom => "#dce8dc",
        RoomType::Bath | RoomType::Ensuite => "#d5e4ee",
        RoomType::Hall | RoomType::Corridor | RoomType::Foyer | RoomType::Stairwell => "#efefec",
        RoomType::Office => "#e3e0ee",
        RoomType::Garage | RoomType::Storage | RoomType::Utility => "#e2e2e2",
        RoomType::Laundry => "#dfe8e8",
        RoomType::Closet => "#eae4da",
        RoomType::Other => "#eeeeee",
    }
}

/// Renders the plan as a complete SVG document.
pub fn render_svg(state: &PlanState, score: Option<&PlanScore>, options: &RenderOptions) -> String {
    let bounds = state.footprint.bounding_rect();
    let scale = options.scale;
    let width_px = bounds.width() * scale + 2.0 * MARGIN_PX;
    let height_px = bounds.height() * scale + 2.0 * MARGIN_PX;

    // Plan coordinates have y growing northward; SVG grows downward.
    let tx = |x: f64| (x - bounds.x1) * scale + MARGIN_PX;
    let ty = |y: f64| (bounds.y2 - y) * scale + MARGIN_PX;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width_px:.0}" height="{height_px:.0}" viewBox="0 0 {width_px:.0} {height_px:.0}">"#
    );

    // Footprint.
    match &state.footprint {
        Footprint::Rect(r) => {
            let _ = writeln!(
                svg,
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{FLOOR_COLOR}" stroke="{WALL_COLOR}" stroke-width="3"/>"#,
                tx(r.x1),
                ty(r.y2),
                r.width() * scale,
                r.height() * scale,
            );
        }
        Footprint::Polygon(p) => {
            let points = p
                .points
                .iter()
                .map(|pt| format!("{:.1},{:.1}", tx(pt.x), ty(pt.y)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                svg,
                r#"  <polygon points="{points}" fill="{FLOOR_COLOR}" stroke="{WALL_COLOR}" stroke-width="3"/>"#
            );
        }
    }

    if options.draw_grid {
        let mut x = bounds.x1.ceil();
        while x < bounds.x2 {
            let _ = writeln!(
                svg,
                r##"  <line x1="{0:.1}" y1="{1:.1}" x2="{0:.1}" y2="{2:.1}" stroke="#dddddd" stroke-width="0.5"/>"##,
                tx(x),
                ty(bounds.y1),
                ty(bounds.y2),
            );
            x += 1.0;
        }
        let mut y = bounds.y1.ceil();
        while y < bounds.y2 {
            let _ = writeln!(
                svg,
                r##"  <line x1="{1:.1}" y1="{0:.1}" x2="{2:.1}" y2="{0:.1}" stroke="#dddddd" stroke-width="0.5"/>"##,
                ty(y),
                tx(bounds.x1),
                tx(bounds.x2),
            );
            y += 1.0;
        }
    }

    if let Some(corridor) = &state.corridor {
        let _ = writeln!(
            svg,
            r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{CORRIDOR_OVERLAY}"/>"#,
            tx(corridor.x1),
            ty(corridor.y2),
            corridor.width() * scale,
            corridor.height() * scale,
        );
    }

    for room in state.rooms() {
        let r = &room.rect;
        let _ = writeln!(
            svg,
            r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" stroke="{WALL_COLOR}" stroke-width="2"/>"#,
            tx(r.x1),
            ty(r.y2),
            r.width() * scale,
            r.height() * scale,
            room_fill(room.kind),
        );
        if options.draw_labels {
            let center = r.center();
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="11" fill="#444444">{}</text>"##,
                tx(center.x),
                ty(center.y) - 3.0,
                xml_escape(&room.label),
            );
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="9" fill="#888888">{:.1} m2</text>"##,
                tx(center.x),
                ty(center.y) + 9.0,
                r.area(),
            );
        }
    }

    for opening in &state.openings {
        if let Some(room) = state.get(&opening.room_id) {
            let seg = opening_span(&room.rect, opening);
            draw_opening(&mut svg, opening, &seg, scale, &tx, &ty);
        }
    }

    if options.draw_score {
        if let Some(score) = score {
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12" fill="#444444">score {:.1}</text>"##,
                MARGIN_PX,
                MARGIN_PX - 6.0,
                score.total,
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// The opening's extent in plan meters: (x1, y1, x2, y2) of a thin strip
/// straddling the wall.
fn opening_span(rect: &Rect, opening: &PlacedOpening) -> Rect {
    let (start, end, at) = rect.edge_segment(opening.edge);
    let center = start + opening.position * (end - start);
    let half = opening.width / 2.0;
    let thickness = 0.09;
    if opening.edge.is_horizontal() {
        Rect::new(center - half, at - thickness, center + half, at + thickness)
    } else {
        Rect::new(at - thickness, center - half, at + thickness, center + half)
    }
}

fn draw_opening(
    svg: &mut String,
    opening: &PlacedOpening,
    span: &Rect,
    scale: f64,
    tx: &dyn Fn(f64) -> f64,
    ty: &dyn Fn(f64) -> f64,
) {
    match opening.kind {
        // Doors read as gaps in the wall.
        OpeningKind::Door => {
            let _ = writeln!(
                svg,
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{FLOOR_COLOR}"/>"#,
                tx(span.x1),
                ty(span.y2),
                span.width() * scale,
                span.height() * scale,
            );
        }
        OpeningKind::Window => {
            let (x1, y1, x2, y2) = if opening.edge.is_horizontal() {
                let y = (span.y1 + span.y2) / 2.0;
                (span.x1, y, span.x2, y)
            } else {
                let x = (span.x1 + span.x2) / 2.0;
                (x, span.y1, x, span.y2)
            };
            let _ = writeln!(
                svg,
                r#"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{WINDOW_COLOR}" stroke-width="4"/>"#,
                tx(x1),
                ty(y1),
                tx(x2),
                ty(y2),
            );
        }
    }
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
