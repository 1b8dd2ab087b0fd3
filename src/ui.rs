use crate::app::{AppState, TreeSource};
use crate::camera::Viewport;
use crate::model::{FileKind, NodeId};
use crate::scene::SceneNode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};
use unicode_width::UnicodeWidthStr;

const BACKGROUND: Color = Color::Black;
const GRID_COLOR: (u8, u8, u8) = (16, 185, 129);
const EDGE_COLOR: (u8, u8, u8) = (74, 222, 128);
const SELECTION_COLOR: (u8, u8, u8) = (96, 165, 250);
const CURSOR_COLOR: (u8, u8, u8) = (251, 191, 36);
const HUD_COLOR: Color = Color::Rgb(110, 231, 183);
const DIM_COLOR: Color = Color::Rgb(120, 120, 130);

const GRID_EXTENT: i32 = 15;
const GRID_MAIN_OPACITY: f32 = 0.2;
const GRID_FAINT_OPACITY: f32 = 0.075;
const EDGE_OPACITY: f32 = 0.4;

/// Main render entry, called once per animation frame.
pub fn render(frame: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    app.scene_area = Some(chunks[0]);

    if app.tree.is_some() {
        render_scene(frame, app, chunks[0]);
        render_hud(frame, app, chunks[0]);
    } else {
        render_entry_screen(frame, chunks[0]);
    }

    if app.show_help {
        render_help(frame, chunks[0]);
    }

    render_status_line(frame, app, chunks[1]);
}

/// Scale a color toward the black background; the terminal stand-in for
/// canvas opacity.
fn fade(color: (u8, u8, u8), alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    Color::Rgb(
        (color.0 as f32 * alpha) as u8,
        (color.1 as f32 * alpha) as u8,
        (color.2 as f32 * alpha) as u8,
    )
}

struct ProjectedNode<'a> {
    node: &'a SceneNode,
    x: f32,
    y: f32,
    scale: f32,
    depth: f32,
}

fn render_scene(frame: &mut Frame, app: &AppState, area: Rect) {
    let viewport = Viewport::of_cells(area.width, area.height);
    let time = app.animation_time();

    let canvas = Canvas::default()
        .background_color(BACKGROUND)
        .marker(Marker::Braille)
        .x_bounds([0.0, viewport.width as f64])
        .y_bounds([0.0, viewport.height as f64])
        .paint(|ctx| {
            draw_floor_grid(ctx, app, viewport);
            draw_tree(ctx, app, viewport, time);
        });
    frame.render_widget(canvas, area);
}

/// Canvas y grows upward; projections use screen-down coordinates.
fn flip(viewport: Viewport, y: f32) -> f64 {
    (viewport.height - y) as f64
}

/// Static floor grid on the X-Z plane: faint unit lines, emphasized zero
/// lines, each individually projected and culled by the scale threshold.
fn draw_floor_grid(ctx: &mut Context, app: &AppState, viewport: Viewport) {
    let mut draw_line = |start: glam::Vec3, end: glam::Vec3, opacity: f32| {
        let (Some(a), Some(b)) = (
            app.camera.project(start, viewport),
            app.camera.project(end, viewport),
        ) else {
            return;
        };
        if !a.is_visible() || !b.is_visible() {
            return;
        }
        ctx.draw(&CanvasLine {
            x1: a.x as f64,
            y1: flip(viewport, a.y),
            x2: b.x as f64,
            y2: flip(viewport, b.y),
            color: fade(GRID_COLOR, opacity * a.scale.min(b.scale)),
        });
    };

    let extent = GRID_EXTENT as f32;
    for i in -GRID_EXTENT..=GRID_EXTENT {
        let opacity = if i == 0 {
            GRID_MAIN_OPACITY
        } else {
            GRID_FAINT_OPACITY
        };
        let offset = i as f32;
        // lines running along Z, then along X
        draw_line(
            glam::Vec3::new(offset, 0.0, -extent),
            glam::Vec3::new(offset, 0.0, extent),
            opacity,
        );
        draw_line(
            glam::Vec3::new(-extent, 0.0, offset),
            glam::Vec3::new(extent, 0.0, offset),
            opacity,
        );
    }
}

fn draw_tree(ctx: &mut Context, app: &AppState, viewport: Viewport, time: f32) {
    // project everything once, then paint farthest-first so nearer nodes
    // overdraw (painter's algorithm)
    let mut projected: Vec<ProjectedNode> = app
        .scene
        .iter()
        .filter_map(|node| {
            let p = app.camera.project(node.animated_position(time), viewport)?;
            Some(ProjectedNode {
                node,
                x: p.x,
                y: p.y,
                scale: p.scale,
                depth: p.depth,
            })
        })
        .collect();
    projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    // connecting branches first, behind the glyphs
    for p in &projected {
        if p.scale <= crate::camera::MIN_VISIBLE_SCALE {
            continue;
        }
        let Some(parent_position) = p.node.parent_position else {
            continue;
        };
        let Some(parent) = app.camera.project(parent_position, viewport) else {
            continue;
        };
        if !parent.is_visible() {
            continue;
        }
        ctx.draw(&CanvasLine {
            x1: parent.x as f64,
            y1: flip(viewport, parent.y),
            x2: p.x as f64,
            y2: flip(viewport, p.y),
            color: fade(EDGE_COLOR, EDGE_OPACITY * p.scale.min(parent.scale)),
        });
    }

    ctx.layer();

    for p in &projected {
        if p.scale <= crate::camera::MIN_VISIBLE_SCALE {
            continue;
        }

        let is_selected = app.selected == Some(p.node.file_id);
        let is_cursor = app.cursor == Some(p.node.file_id);

        let shimmer = p.node.shimmer(time);
        let alpha = (p.scale * 1.3).min(1.0) * shimmer;

        // selection highlight wins over the navigation cursor
        let color = if is_selected {
            SELECTION_COLOR
        } else if is_cursor {
            CURSOR_COLOR
        } else {
            p.node.color
        };

        // glyph size floored so distant nodes stay legible
        let size = (32.0 * p.scale).max(24.0);

        if is_selected {
            ctx.draw(&Circle {
                x: p.x as f64,
                y: flip(viewport, p.y),
                radius: (size * 0.8) as f64,
                color: fade(SELECTION_COLOR, 0.6),
            });
        } else if is_cursor {
            ctx.draw(&Circle {
                x: p.x as f64,
                y: flip(viewport, p.y),
                radius: (size * 0.9) as f64,
                color: fade(CURSOR_COLOR, 0.8),
            });
        }

        let mut style = Style::default().fg(fade(color, alpha));
        if p.node.is_root || is_selected || is_cursor {
            style = style.add_modifier(Modifier::BOLD);
        }
        ctx.print(
            p.x as f64,
            flip(viewport, p.y),
            Line::from(Span::styled(p.node.glyph, style)),
        );
    }
}

fn render_hud(frame: &mut Frame, app: &AppState, area: Rect) {
    if area.width < 40 || area.height < 6 {
        return;
    }

    // top-left: source mode
    let title = match &app.source {
        TreeSource::Sample => "Sample files · 3D explorer".to_string(),
        TreeSource::Real(path) => format!("Real file system · {}", path.display()),
        TreeSource::None => String::new(),
    };
    let mut left_lines = vec![Line::from(Span::styled(
        title,
        Style::default().fg(HUD_COLOR).add_modifier(Modifier::BOLD),
    ))];
    if app.scanning {
        left_lines.push(Line::from(Span::styled(
            "scanning…",
            Style::default().fg(DIM_COLOR),
        )));
    }
    if app.ops_in_flight > 0 {
        left_lines.push(Line::from(Span::styled(
            format!("{} operation(s) in flight", app.ops_in_flight),
            Style::default().fg(DIM_COLOR),
        )));
    }
    if !app.clusters.is_empty() {
        left_lines.push(Line::from(Span::styled(
            format!("{} content cluster(s) suggested", app.clusters.len()),
            Style::default().fg(DIM_COLOR),
        )));
    }
    let left_height = left_lines.len() as u16;
    let left = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2).min(60), left_height);
    frame.render_widget(Paragraph::new(left_lines), left);

    // top-right: navigation cursor and selection readout
    let mut right_lines: Vec<Line> = Vec::new();
    if let Some(entry) = lookup(app, app.cursor) {
        right_lines.push(Line::from(Span::styled(
            format!("Navigating: {}", entry.0),
            Style::default().fg(Color::Rgb(CURSOR_COLOR.0, CURSOR_COLOR.1, CURSOR_COLOR.2)),
        )));
        right_lines.push(Line::from(Span::styled(
            entry.1,
            Style::default().fg(DIM_COLOR),
        )));
        if let Some(state) = entry.2 {
            right_lines.push(Line::from(Span::styled(
                state,
                Style::default().fg(DIM_COLOR),
            )));
        }
    }
    if app.selected != app.cursor {
        if let Some(entry) = lookup(app, app.selected) {
            right_lines.push(Line::from(Span::styled(
                format!("Selected: {}", entry.0),
                Style::default().fg(Color::Rgb(
                    SELECTION_COLOR.0,
                    SELECTION_COLOR.1,
                    SELECTION_COLOR.2,
                )),
            )));
        }
    }
    if !right_lines.is_empty() {
        let width = right_lines
            .iter()
            .map(|line| line.width() as u16)
            .max()
            .unwrap_or(0)
            .min(area.width / 2);
        let height = right_lines.len() as u16;
        let right = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            area.y,
            width,
            height.min(area.height),
        );
        frame.render_widget(Paragraph::new(right_lines), right);
    }
}

/// (name, path, expansion-state label) of a node, for the HUD.
fn lookup(app: &AppState, id: Option<NodeId>) -> Option<(String, String, Option<String>)> {
    let tree = app.tree.as_ref()?;
    let entry = tree.get(id?)?;
    let state = (entry.kind == FileKind::Directory).then(|| {
        if entry.is_expanded {
            "▾ expanded".to_string()
        } else {
            "▸ collapsed".to_string()
        }
    });
    Some((entry.name.clone(), entry.path.clone(), state))
}

fn render_entry_screen(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "filescape",
            Style::default().fg(HUD_COLOR).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("No directory loaded."),
        Line::from(""),
        Line::from(Span::styled(
            "filescape <DIR>   explore a real directory (read/write)",
            Style::default().fg(DIM_COLOR),
        )),
        Line::from(Span::styled(
            "Space             load the bundled sample tree",
            Style::default().fg(DIM_COLOR),
        )),
        Line::from(Span::styled(
            "Esc               quit",
            Style::default().fg(DIM_COLOR),
        )),
    ];
    let height = lines.len() as u16;
    let top = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, top.min(area.bottom().saturating_sub(1)), area.width, height.min(area.height));
    frame.render_widget(
        Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center),
        centered,
    );
}

struct HelpSection {
    title: &'static str,
    items: &'static [(&'static str, &'static str)],
}

const HELP_SECTIONS: &[HelpSection] = &[
    HelpSection {
        title: "Camera",
        items: &[
            ("drag", "rotate view"),
            ("shift+drag", "pan"),
            ("wheel", "zoom in/out"),
            ("w/a/s/d", "move forward/left/back/right"),
            ("q/e", "move up/down"),
            ("c", "recenter behind cursor"),
        ],
    },
    HelpSection {
        title: "Navigation",
        items: &[
            ("arrows", "jump to the nearest node in that direction"),
            ("click", "select node under the pointer"),
            ("enter", "expand/collapse cursor directory"),
        ],
    },
    HelpSection {
        title: "Files",
        items: &[
            ("m", "mark node as operation source"),
            ("p", "copy marked node into cursor directory"),
            ("v", "move marked node into cursor directory"),
            ("delete", "delete cursor file (press twice)"),
            ("y", "yank cursor path to clipboard"),
            ("g", "request content clusters"),
        ],
    },
    HelpSection {
        title: "Misc",
        items: &[
            ("space", "toggle sample tree"),
            ("?", "toggle this help"),
            ("esc / ctrl+c", "quit"),
        ],
    },
];

fn render_help(frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for section in HELP_SECTIONS {
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default().fg(HUD_COLOR).add_modifier(Modifier::BOLD),
        )));
        for (keys, description) in section.items {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<12}"), Style::default().fg(Color::White)),
                Span::styled(*description, Style::default().fg(DIM_COLOR)),
            ]));
        }
        lines.push(Line::from(""));
    }

    let height = (lines.len() as u16 + 2).min(area.height);
    let width = 58.min(area.width);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(" Help ").borders(Borders::ALL)),
        popup,
    );
}

fn render_status_line(frame: &mut Frame, app: &AppState, area: Rect) {
    let left = match &app.message {
        Some(message) => message.clone(),
        None => match app.source {
            TreeSource::None => "Space: sample tree · ?: help".to_string(),
            _ => "?: help".to_string(),
        },
    };

    let camera = &app.camera;
    let right = format!(
        "cam ({:.1}, {:.1}, {:.1}) yaw {:.2} pitch {:.2}",
        camera.position.x, camera.position.y, camera.position.z, camera.yaw, camera.pitch
    );

    let total = area.width as usize;
    let left_width = left.width();
    let right_width = right.width();
    let padding = total.saturating_sub(left_width + right_width);

    let line = Line::from(vec![
        Span::styled(left, Style::default().fg(Color::White)),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(DIM_COLOR)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
