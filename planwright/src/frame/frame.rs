//! The layout frame: a fixed partition of the footprint into vertical
//! bands and horizontal depth zones whose cartesian product forms the
//! cells rooms are placed into. Built once per solve and never mutated.

#[cfg(test)]
mod test;

use log::debug;
use serde::Serialize;

use crate::{
    geom::{snap, Edge, Footprint, Rect},
    intent::NormalizedIntent,
};

/// Vertical slice of the footprint, spanning its full depth.
#[derive(Debug, Clone, Serialize)]
pub struct Band {
    pub id: String,
    pub x1: f64,
    pub x2: f64,
}

impl Band {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }
}

/// Horizontal slice of the footprint, spanning its full width. Depths are
/// stored front-to-back; for a north or east front edge the front zone is
/// the one with the *higher* coordinate.
#[derive(Debug, Clone, Serialize)]
pub struct Depth {
    pub id: String,
    pub y1: f64,
    pub y2: f64,
}

impl Depth {
    pub fn depth(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// One band x depth intersection. For polygon footprints a cell may lie
/// entirely outside the buildable region, in which case it is kept (the
/// grid stays rectangular) but marked unusable.
#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub band_id: String,
    pub depth_id: String,
    pub rect: Rect,
    pub inside_footprint: bool,
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub rect: Rect,
    pub footprint: Footprint,
    pub bands: Vec<Band>,
    pub depths: Vec<Depth>,
    pub cells: Vec<Cell>,
    pub front_edge: Edge,
    pub garden_edge: Option<Edge>,
}

impl Frame {
    pub fn build(intent: &NormalizedIntent) -> Frame {
        let rect = intent.footprint.bounding_rect();

        let bands = if intent.bands.is_empty() {
            derive_bands(intent, &rect)
        } else {
            explicit_bands(intent, &rect)
        };
        let depths = if intent.depths.is_empty() {
            derive_depths(intent, &rect)
        } else {
            explicit_depths(intent, &rect)
        };

        let mut cells = Vec::with_capacity(bands.len() * depths.len());
        for band in &bands {
            for depth in &depths {
                let cell_rect = Rect::new(band.x1, depth.y1, band.x2, depth.y2);
                let inside_footprint = if intent.footprint.is_polygon() {
                    intent.footprint.overlaps_rect(&cell_rect)
                } else {
                    true
                };
                cells.push(Cell {
                    band_id: band.id.clone(),
                    depth_id: depth.id.clone(),
                    rect: cell_rect,
                    inside_footprint,
                });
            }
        }

        debug!(
            "frame: {} bands x {} depths, {} cells ({} usable)",
            bands.len(),
            depths.len(),
            cells.len(),
            cells.iter().filter(|c| c.inside_footprint).count()
        );

        Frame {
            rect,
            footprint: intent.footprint.clone(),
            bands,
            depths,
            cells,
            front_edge: intent.front_edge,
            garden_edge: intent.garden_edge,
        }
    }

    pub fn band(&self, id: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.id == id)
    }

    pub fn depth(&self, id: &str) -> Option<&Depth> {
        self.depths.iter().find(|d| d.id == id)
    }

    /// Index of the band holding the given x midpoint, if any.
    pub fn band_at(&self, x: f64) -> Option<&Band> {
        self.bands.iter().find(|b| x >= b.x1 && x <= b.x2)
    }

    /// Cells whose interiors are usable for placement.
    pub fn usable_cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate().filter(|(_, c)| c.inside_footprint)
    }
}

/// Distributes explicit band requests across the footprint width:
/// proportional to targets, clamped by min/max, remainder absorbed by the
/// last band so the partition always covers the full width exactly.
fn explicit_bands(intent: &NormalizedIntent, rect: &Rect) -> Vec<Band> {
    let width = rect.width();
    let n = intent.bands.len();
    let targets: Vec<f64> = intent
        .bands
        .iter()
        .map(|b| b.target_width.unwrap_or(width / n as f64))
        .collect();
    let total: f64 = targets.iter().sum();
    let scale = if total > 0.0 { width / total } else { 1.0 };

    let mut out = Vec::with_capacity(n);
    let mut x = rect.x1;
    for (i, spec) in intent.bands.iter().enumerate() {
        let mut w = targets[i] * scale;
        if let Some(min) = spec.min_width {
            w = w.max(min);
        }
        if let Some(max) = spec.max_width {
            w = w.min(max);
        }
        let x2 = if i == n - 1 { rect.x2 } else { snap((x + w).min(rect.x2)) };
        out.push(Band {
            id: spec.id.clone(),
            x1: x,
            x2,
        });
        x = x2;
    }
    out
}

fn explicit_depths(intent: &NormalizedIntent, rect: &Rect) -> Vec<Depth> {
    let height = rect.height();
    let n = intent.depths.len();
    let targets: Vec<f64> = intent
        .depths
        .iter()
        .map(|d| d.target_depth.unwrap_or(height / n as f64))
        .collect();
    let total: f64 = targets.iter().sum();
    let scale = if total > 0.0 { height / total } else { 1.0 };

    // Specs are listed front-to-back. With a south or west front edge the
    // front zone starts at the low coordinate; otherwise it hugs the top.
    let front_low = matches!(intent.front_edge, Edge::South | Edge::West);

    let mut spans = Vec::with_capacity(n);
    let mut pos = if front_low { rect.y1 } else { rect.y2 };
    for (i, spec) in intent.depths.iter().enumerate() {
        let mut d = targets[i] * scale;
        if let Some(min) = spec.min_depth {
            d = d.max(min);
        }
        if let Some(max) = spec.max_depth {
            d = d.min(max);
        }
        let span = if front_low {
            let y2 = if i == n - 1 { rect.y2 } else { snap((pos + d).min(rect.y2)) };
            let s = (pos, y2);
            pos = y2;
            s
        } else {
            let y1 = if i == n - 1 { rect.y1 } else { snap((pos - d).max(rect.y1)) };
            let s = (y1, pos);
            pos = y1;
            s
        };
        spans.push((spec.id.clone(), span));
    }

    spans
        .into_iter()
        .map(|(id, (y1, y2))| Depth { id, y1, y2 })
        .collect()
}

/// With no explicit bands, room preferences decide the partition: left
/// and right preferences split the width 40/60, a center preference makes
/// a 30/40/30 triple, and otherwise a single full-width band is used.
fn derive_bands(intent: &NormalizedIntent, rect: &Rect) -> Vec<Band> {
    let prefers = |name: &str| {
        intent
            .rooms
            .iter()
            .any(|r| r.preferred_bands.iter().any(|b| b == name))
    };

    let width = rect.width();
    if prefers("left") && prefers("right") {
        let split = snap(rect.x1 + width * 0.4);
        vec![
            Band {
                id: "left".into(),
                x1: rect.x1,
                x2: split,
            },
            Band {
                id: "right".into(),
                x1: split,
                x2: rect.x2,
            },
        ]
    } else if prefers("center") {
        let a = snap(rect.x1 + width * 0.3);
        let b = snap(rect.x1 + width * 0.7);
        vec![
            Band {
                id: "left".into(),
                x1: rect.x1,
                x2: a,
            },
            Band {
                id: "center".into(),
                x1: a,
                x2: b,
            },
            Band {
                id: "right".into(),
                x1: b,
                x2: rect.x2,
            },
        ]
    } else {
        vec![Band {
            id: "full".into(),
            x1: rect.x1,
            x2: rect.x2,
        }]
    }
}

fn derive_depths(intent: &NormalizedIntent, rect: &Rect) -> Vec<Depth> {
    let prefers = |name: &str| {
        intent
            .rooms
            .iter()
            .any(|r| r.preferred_depths.iter().any(|d| d == name))
    };

    let front_low = matches!(intent.front_edge, Edge::South | Edge::West);
    let (front_y, back_y) = if front_low { (rect.y1, rect.y2) } else { (rect.y2, rect.y1) };

    let make = |id: &str, a: f64, b: f64| Depth {
        id: id.into(),
        y1: a.min(b),
        y2: a.max(b),
    };

    if prefers("front") && prefers("back") {
        // Front zone takes 40% nearest the front edge.
        let split = snap(front_y + (back_y - front_y) * 0.4);
        vec![make("front", front_y, split), make("back", split, back_y)]
    } else if prefers("middle") {
        let a = snap(front_y + (back_y - front_y) * 0.3);
        let b = snap(front_y + (back_y - front_y) * 0.7);
        vec![make("front", front_y, a), make("middle", a, b), make("back", b, back_y)]
    } else {
        vec![Depth {
            id: "full".into(),
            y1: rect.y1,
            y2: rect.y2,
        }]
    }
}
