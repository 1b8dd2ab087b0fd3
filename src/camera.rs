use glam::Vec3;
use std::f32::consts::PI;

/// Focal distance of the perspective divide.
pub const DEFAULT_PROJECTION_DISTANCE: f32 = 8.0;
/// Screen-space magnification of projected coordinates.
pub const DEFAULT_MAGNIFICATION: f32 = 120.0;
/// Projections at or below this scale are behind the camera or too far to
/// render or hit-test; callers must skip them.
pub const MIN_VISIBLE_SCALE: f32 = 0.1;
/// Pitch is clamped to roughly ±72° to prevent flipping.
pub const PITCH_LIMIT: f32 = PI / 2.5;
/// Per-frame translation for held movement keys.
pub const DEFAULT_MOVE_SPEED: f32 = 0.08;

const ROTATE_SPEED: f32 = 0.008;
const PAN_SPEED: f32 = 0.02;
const ZOOM_STEP: f32 = 0.05;
const RECENTER_DISTANCE: f32 = 1.5;
const RECENTER_LIFT: f32 = 1.0;
const DEGENERATE_DENOMINATOR: f32 = 1e-4;

/// Terminal cells are mapped to a virtual-pixel space so the projection
/// constants keep their original meaning on any terminal size.
pub const PX_PER_CELL_X: f32 = 10.0;
pub const PX_PER_CELL_Y: f32 = 20.0;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Virtual-pixel viewport for a terminal area of `cols` × `rows` cells.
    pub fn of_cells(cols: u16, rows: u16) -> Self {
        Self {
            width: cols as f32 * PX_PER_CELL_X,
            height: rows as f32 * PX_PER_CELL_Y,
        }
    }

    /// Center of the cell at (col, row), in virtual pixels.
    pub fn cell_center(col: u16, row: u16) -> (f32, f32) {
        (
            col as f32 * PX_PER_CELL_X + PX_PER_CELL_X / 2.0,
            row as f32 * PX_PER_CELL_Y + PX_PER_CELL_Y / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub depth: f32,
}

impl Projection {
    pub fn is_visible(&self) -> bool {
        self.scale > MIN_VISIBLE_SCALE
    }
}

/// Movement keys held down this frame; W/S forward-back, A/D strafe,
/// Q/E world-vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Rise,
    Sink,
}

/// Single process-wide camera: position plus pitch and yaw (no roll).
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub distance: f32,
    pub magnification: f32,
    pub move_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            // close in, slightly above, looking down at the anchor
            position: Vec3::new(0.0, 2.0, -1.2),
            pitch: -0.2,
            yaw: 0.0,
            distance: DEFAULT_PROJECTION_DISTANCE,
            magnification: DEFAULT_MAGNIFICATION,
            move_speed: DEFAULT_MOVE_SPEED,
        }
    }
}

impl Camera {
    /// Project a world point to virtual-pixel screen coordinates: translate
    /// by the camera position, rotate yaw-then-pitch, perspective divide.
    /// Returns `None` when the denominator degenerates; callers additionally
    /// skip results failing [`Projection::is_visible`].
    pub fn project(&self, point: Vec3, viewport: Viewport) -> Option<Projection> {
        let rel = point - self.position;
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();

        let x1 = rel.x * cos_yaw - rel.z * sin_yaw;
        let z1 = rel.x * sin_yaw + rel.z * cos_yaw;

        let y2 = rel.y * cos_pitch - z1 * sin_pitch;
        let z2 = rel.y * sin_pitch + z1 * cos_pitch;

        let denominator = self.distance + z2;
        if denominator.abs() < DEGENERATE_DENOMINATOR {
            return None;
        }

        let scale = self.distance / denominator;
        Some(Projection {
            x: viewport.width / 2.0 + x1 * scale * self.magnification,
            y: viewport.height / 2.0 - y2 * scale * self.magnification,
            scale,
            depth: z2,
        })
    }

    /// Mouse-drag rotation; deltas in virtual pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * ROTATE_SPEED;
        self.pitch = (self.pitch + dy * ROTATE_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Shift-drag panning; always relative to the current view orientation.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let sin_pitch = self.pitch.sin();
        self.position.x -= (dx * cos_yaw + dy * sin_yaw * sin_pitch) * PAN_SPEED;
        self.position.y += dy * self.pitch.cos() * PAN_SPEED;
        self.position.z += (dx * sin_yaw - dy * cos_yaw * sin_pitch) * PAN_SPEED;
    }

    /// Wheel zoom: translate along the yaw-derived forward vector. Positive
    /// notches move forward.
    pub fn zoom(&mut self, notches: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.position.x += sin_yaw * notches * ZOOM_STEP;
        self.position.z += cos_yaw * notches * ZOOM_STEP;
    }

    /// Integrate held movement keys over `frames` frames (continuous, not
    /// single-shot). Pure over (held set, frames) so it is testable without
    /// a terminal.
    pub fn apply_movement<'a>(&mut self, held: impl IntoIterator<Item = &'a MoveKey>, frames: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let step = self.move_speed * frames;
        for key in held {
            match key {
                MoveKey::Forward => {
                    self.position.x += sin_yaw * step;
                    self.position.z += cos_yaw * step;
                }
                MoveKey::Back => {
                    self.position.x -= sin_yaw * step;
                    self.position.z -= cos_yaw * step;
                }
                MoveKey::StrafeLeft => {
                    self.position.x -= cos_yaw * step;
                    self.position.z += sin_yaw * step;
                }
                MoveKey::StrafeRight => {
                    self.position.x += cos_yaw * step;
                    self.position.z -= sin_yaw * step;
                }
                MoveKey::Rise => self.position.y += step,
                MoveKey::Sink => self.position.y -= step,
            }
        }
    }

    /// Jump to hover just behind `target` at a fixed close distance, keeping
    /// the current orientation.
    pub fn recenter_behind(&mut self, target: Vec3) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.position = target
            + Vec3::new(
                -sin_yaw * RECENTER_DISTANCE,
                RECENTER_LIFT,
                -cos_yaw * RECENTER_DISTANCE,
            );
    }
}
