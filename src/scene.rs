use crate::model::{FileKind, FileTree, NodeId};
use glam::Vec3;
use rand::Rng;
use std::collections::HashSet;
use std::f32::consts::TAU;

/// The root node is pinned here regardless of tree shape.
pub const ROOT_ANCHOR: Vec3 = Vec3::new(0.0, 2.0, 0.0);

const BASE_RADIUS: f32 = 1.5;
const RADIUS_PER_DEPTH: f32 = 0.3;
/// Children sit below their parent so the tree grows downward.
const LEVEL_DROP: f32 = 1.2;
/// Positions are quantized to cells of ~1/3 unit for collision checks.
const CELL_SCALE: f32 = 3.0;
const MAX_PLACEMENT_RETRIES: u32 = 10;

/// A renderable, positioned projection of one visible file-tree entry.
/// Regenerated wholesale whenever the visible tree changes; the animation
/// phases are rolled once here and stay fixed for the node's lifetime.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub glyph: &'static str,
    pub color: (u8, u8, u8),
    pub position: Vec3,
    pub is_root: bool,
    pub shimmer_phase: f32,
    pub hover_phase: f32,
    pub file_id: NodeId,
    pub depth: usize,
    pub parent_position: Option<Vec3>,
    /// Recognized kind/extension glyphs get a shimmer boost.
    pub is_special: bool,
}

impl SceneNode {
    /// Vertical oscillation offset at animation time `time` (seconds).
    pub fn hover_offset(&self, time: f32) -> f32 {
        let (speed, amplitude) = if self.is_root { (0.8, 0.08) } else { (1.2, 0.05) };
        (time * speed + self.hover_phase).sin() * amplitude
    }

    /// Brightness multiplier at animation time `time`; oscillates around 1.
    pub fn shimmer(&self, time: f32) -> f32 {
        let (speed, intensity) = if self.is_root { (1.5, 0.3) } else { (2.0, 0.2) };
        let base = (time * speed + self.shimmer_phase).sin() * intensity + 1.0;
        if self.is_special {
            base * 1.2
        } else {
            base
        }
    }

    pub fn animated_position(&self, time: f32) -> Vec3 {
        self.position + Vec3::new(0.0, self.hover_offset(time), 0.0)
    }
}

/// Lay out every visible node of `tree` in 3D space. Jitter comes from `rng`;
/// pass a seeded generator for a deterministic layout.
pub fn build_scene(tree: &FileTree, rng: &mut impl Rng) -> Vec<SceneNode> {
    let mut nodes = Vec::new();
    let mut used_cells = HashSet::new();
    used_cells.insert(cell_key(ROOT_ANCHOR));

    nodes.push(make_node(tree, tree.root(), ROOT_ANCHOR, 0, None, rng));
    descend(tree, tree.root(), ROOT_ANCHOR, 0, &mut used_cells, &mut nodes, rng);
    nodes
}

fn descend(
    tree: &FileTree,
    id: NodeId,
    position: Vec3,
    depth: usize,
    used_cells: &mut HashSet<(i32, i32, i32)>,
    out: &mut Vec<SceneNode>,
    rng: &mut impl Rng,
) {
    let entry = match tree.get(id) {
        Some(entry) => entry,
        None => return,
    };
    if !entry.is_dir() || !entry.is_expanded {
        return;
    }

    let children: Vec<NodeId> = tree.children(id).collect();
    if children.is_empty() {
        return;
    }

    let spots = place_children(position, children.len(), depth + 1, used_cells, rng);
    for (child, spot) in children.into_iter().zip(spots) {
        out.push(make_node(tree, child, spot, depth + 1, Some(position), rng));
        descend(tree, child, spot, depth + 1, used_cells, out, rng);
    }
}

fn make_node(
    tree: &FileTree,
    id: NodeId,
    position: Vec3,
    depth: usize,
    parent_position: Option<Vec3>,
    rng: &mut impl Rng,
) -> SceneNode {
    let entry = tree.get(id).expect("scene built from a live tree");
    let (glyph, is_special) = glyph_for(entry.kind, entry.extension.as_deref(), entry.is_expanded);
    SceneNode {
        glyph,
        color: color_for(entry.kind, entry.extension.as_deref()),
        position,
        is_root: depth == 0,
        shimmer_phase: rng.gen_range(0.0..TAU),
        hover_phase: rng.gen_range(0.0..TAU),
        file_id: id,
        depth,
        parent_position,
        is_special,
    }
}

/// Distribute `count` children on a jittered circle around `parent`, with a
/// downward bias and a depth-axis spread. Each accepted position claims a
/// quantized grid cell; collisions retry with a growing random offset up to
/// 10 times, then the position is accepted regardless (tiny residual overlap
/// probability, accepted).
fn place_children(
    parent: Vec3,
    count: usize,
    depth: usize,
    used_cells: &mut HashSet<(i32, i32, i32)>,
    rng: &mut impl Rng,
) -> Vec<Vec3> {
    let base_radius = BASE_RADIUS + depth as f32 * RADIUS_PER_DEPTH;
    let mut positions = Vec::with_capacity(count);

    for i in 0..count {
        let angle = i as f32 / count as f32 * TAU;
        let radius = base_radius * rng.gen_range(0.8..1.2);

        let mut position = Vec3::new(
            parent.x + angle.cos() * radius,
            parent.y - LEVEL_DROP + rng.gen_range(-0.5..0.5),
            parent.z + angle.sin() * radius + rng.gen_range(-0.75..0.75),
        );

        let mut attempts = 0;
        while used_cells.contains(&cell_key(position)) && attempts < MAX_PLACEMENT_RETRIES {
            let offset = 0.3 + attempts as f32 * 0.2;
            let offset_angle = rng.gen_range(0.0..TAU);
            position.x += offset_angle.cos() * offset;
            position.y += rng.gen_range(-0.5..0.5) * offset;
            position.z += offset_angle.sin() * offset;
            attempts += 1;
        }

        used_cells.insert(cell_key(position));
        positions.push(position);
    }

    positions
}

fn cell_key(position: Vec3) -> (i32, i32, i32) {
    (
        (position.x * CELL_SCALE).round() as i32,
        (position.y * CELL_SCALE).round() as i32,
        (position.z * CELL_SCALE).round() as i32,
    )
}

const DEFAULT_GLYPH: &str = "●";

/// Static glyph lookup by kind and extension. The second value flags
/// "special" glyphs (recognized categories) for the shimmer boost.
pub fn glyph_for(kind: FileKind, extension: Option<&str>, expanded: bool) -> (&'static str, bool) {
    if kind == FileKind::Directory {
        return (if expanded { "▾" } else { "▸" }, true);
    }
    let glyph = match extension {
        Some("md") => "✎",
        Some("tsx" | "jsx" | "ts" | "js") => "λ",
        Some("html") => "◉",
        Some("css") => "❖",
        Some("pdf") => "▤",
        Some("xlsx" | "xls") => "▦",
        Some("jpg" | "jpeg" | "png" | "gif") => "▣",
        Some("mp4" | "avi" | "mov") => "►",
        Some("json") => "✦",
        Some("log") => "≡",
        _ => return (DEFAULT_GLYPH, false),
    };
    (glyph, true)
}

/// Static color lookup by kind and extension (RGB).
pub fn color_for(kind: FileKind, extension: Option<&str>) -> (u8, u8, u8) {
    if kind == FileKind::Directory {
        return (59, 130, 246); // blue
    }
    match extension {
        Some("md") => (16, 185, 129),                      // green
        Some("tsx" | "jsx" | "ts" | "js") => (245, 158, 11), // amber
        Some("html") => (239, 68, 68),                     // red
        Some("css") => (139, 92, 246),                     // purple
        Some("pdf") => (220, 38, 38),                      // dark red
        Some("xlsx" | "xls") => (5, 150, 105),             // emerald
        Some("jpg" | "jpeg" | "png" | "gif") => (236, 72, 153), // pink
        Some("mp4" | "avi" | "mov") => (124, 58, 237),     // violet
        Some("json") => (107, 114, 128),                   // gray
        Some("log") => (55, 65, 81),                       // dark gray
        _ => (156, 163, 175),                              // light gray
    }
}
