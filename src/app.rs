use crate::analysis::ContentCluster;
use crate::camera::{Camera, MoveKey, Viewport};
use crate::config::AppConfig;
use crate::fsops::WorkerEvent;
use crate::model::{FileTree, NodeId};
use crate::scene::{self, SceneNode};
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Held movement keys expire after this window without a repeat; terminals
/// without key-release reporting only give us press/repeat edges.
pub const KEY_HOLD_WINDOW: Duration = Duration::from_millis(500);
/// The movement integrator is calibrated in frames at this rate.
pub const TARGET_FPS: f32 = 60.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    /// Entry state: nothing loaded yet.
    None,
    /// The bundled demo tree; operations are not mirrored anywhere.
    Sample,
    /// A granted real directory; operations hit the filesystem.
    Real(PathBuf),
}

impl TreeSource {
    pub fn is_real(&self) -> bool {
        matches!(self, TreeSource::Real(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
}

/// Mouse gesture in progress; `moved` distinguishes a drag from a click.
#[derive(Debug, Clone, Copy)]
pub struct DragGesture {
    pub mode: DragMode,
    pub last: (u16, u16),
    pub moved: bool,
}

pub struct AppState {
    pub running: bool,
    pub config: AppConfig,
    pub source: TreeSource,
    pub tree: Option<FileTree>,
    pub camera: Camera,
    pub scene: Vec<SceneNode>,

    /// Node shown in the selection readout (mouse-driven).
    pub selected: Option<NodeId>,
    /// Node focused for keyboard spatial navigation.
    pub cursor: Option<NodeId>,
    /// Operation source marked for copy/move.
    pub marked: Option<NodeId>,
    /// Delete asked once; a second ask within the same focus confirms.
    pub pending_delete: Option<NodeId>,

    pub held_keys: HashMap<MoveKey, Instant>,
    pub drag: Option<DragGesture>,
    pub show_help: bool,
    pub message: Option<String>,
    /// Canvas region of the last frame, for mouse-to-viewport mapping.
    pub scene_area: Option<Rect>,

    pub clusters: Vec<ContentCluster>,
    pub scanning: bool,
    pub ops_in_flight: usize,

    started: Instant,
    worker_tx: Sender<WorkerEvent>,
    worker_rx: Receiver<WorkerEvent>,
    pub analysis_rx: Option<Receiver<Vec<ContentCluster>>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let camera = Camera {
            distance: config.projection_distance,
            magnification: config.magnification,
            move_speed: config.move_speed,
            ..Camera::default()
        };
        let (worker_tx, worker_rx) = mpsc::channel();

        Self {
            running: true,
            config,
            source: TreeSource::None,
            tree: None,
            camera,
            scene: Vec::new(),
            selected: None,
            cursor: None,
            marked: None,
            pending_delete: None,
            held_keys: HashMap::new(),
            drag: None,
            show_help: false,
            message: None,
            scene_area: None,
            clusters: Vec::new(),
            scanning: false,
            ops_in_flight: 0,
            started: Instant::now(),
            worker_tx,
            worker_rx,
            analysis_rx: None,
        }
    }

    /// Seconds since startup; drives every shimmer/hover oscillation.
    pub fn animation_time(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    pub fn worker_sender(&self) -> Sender<WorkerEvent> {
        self.worker_tx.clone()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.scene_area
            .map(|area| Viewport::of_cells(area.width, area.height))
    }

    pub fn scene_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.scene.iter().find(|node| node.file_id == id)
    }

    /// Regenerate the whole scene from the current tree (never patched
    /// incrementally). Production layouts jitter from entropy.
    pub fn rebuild_scene(&mut self) {
        self.scene = match &self.tree {
            Some(tree) => scene::build_scene(tree, &mut rand::thread_rng()),
            None => Vec::new(),
        };
    }

    pub fn set_tree(&mut self, tree: FileTree, source: TreeSource) {
        self.cursor = Some(tree.root());
        self.selected = None;
        self.marked = None;
        self.pending_delete = None;
        self.clusters.clear();
        self.tree = Some(tree);
        self.source = source;
        self.rebuild_scene();
    }

    pub fn clear_tree(&mut self) {
        self.tree = None;
        self.source = TreeSource::None;
        self.scene.clear();
        self.cursor = None;
        self.selected = None;
        self.marked = None;
        self.pending_delete = None;
        self.clusters.clear();
    }

    /// Select + move the navigation cursor to `id`; a directory auto-expands
    /// (never auto-collapses), which regenerates the scene.
    pub fn focus_node(&mut self, id: NodeId) {
        self.selected = Some(id);
        self.cursor = Some(id);
        let expanded = match &mut self.tree {
            Some(tree) => tree.expand(id),
            None => false,
        };
        if expanded {
            self.rebuild_scene();
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn press_move_key(&mut self, key: MoveKey) {
        self.held_keys.insert(key, Instant::now());
    }

    pub fn release_move_key(&mut self, key: MoveKey) {
        self.held_keys.remove(&key);
    }

    pub fn release_all_keys(&mut self) {
        self.held_keys.clear();
    }

    /// Per-frame work: expire stale held keys, then integrate camera
    /// movement over the elapsed frame count.
    pub fn tick(&mut self, dt: Duration) {
        let now = Instant::now();
        self.held_keys
            .retain(|_, last_seen| now.duration_since(*last_seen) < KEY_HOLD_WINDOW);

        if !self.held_keys.is_empty() {
            let frames = dt.as_secs_f32() * TARGET_FPS;
            let keys: Vec<MoveKey> = self.held_keys.keys().copied().collect();
            self.camera.apply_movement(keys.iter(), frames);
        }
    }

    /// Drain worker channels. Called once per frame; never blocks.
    pub fn poll_background(&mut self) {
        while let Ok(event) = self.worker_rx.try_recv() {
            match event {
                WorkerEvent::ScanFinished(result) => {
                    self.scanning = false;
                    match result {
                        // a scan result only lands while the source is still
                        // the scanned directory; otherwise drop it
                        Ok(tree) if self.source.is_real() => {
                            let source = self.source.clone();
                            let total = tree.count();
                            self.set_tree(tree, source);
                            self.set_message(format!("Scanned {total} entries"));
                        }
                        Ok(_) => {}
                        Err(error) => {
                            self.set_message(format!("Scan failed: {error}"));
                        }
                    }
                }
                WorkerEvent::OpFinished { outcome, tree } => {
                    self.ops_in_flight = self.ops_in_flight.saturating_sub(1);
                    match outcome.result {
                        Ok(()) => {
                            self.set_message(format!(
                                "{} {} done",
                                outcome.kind.label(),
                                outcome.source.display()
                            ));
                            if let Some(tree) = tree {
                                if self.source.is_real() {
                                    self.replace_tree_snapshot(tree);
                                }
                            }
                        }
                        Err(error) => {
                            // tree left unchanged; no retry, no rollback
                            self.set_message(format!(
                                "{} failed: {error}",
                                outcome.kind.label()
                            ));
                        }
                    }
                }
            }
        }

        let analysis = self.analysis_rx.as_ref().map(|rx| rx.try_recv());
        match analysis {
            Some(Ok(clusters)) => {
                self.analysis_rx = None;
                if clusters.is_empty() {
                    self.set_message("Analysis found no clusters");
                } else {
                    let names: Vec<&str> = clusters.iter().map(|c| c.name.as_str()).collect();
                    self.set_message(format!("Clusters: {}", names.join(", ")));
                }
                self.clusters = clusters;
            }
            Some(Err(mpsc::TryRecvError::Disconnected)) => self.analysis_rx = None,
            _ => {}
        }
    }

    /// Swap in a fresh whole-tree snapshot, re-anchoring cursor, selection
    /// and mark by path (arena ids do not survive the swap).
    fn replace_tree_snapshot(&mut self, tree: FileTree) {
        let (cursor_path, selected_path, marked_path) = {
            let old = self.tree.as_ref();
            let path_of = |id: Option<NodeId>| -> Option<String> {
                old.and_then(|tree| id.and_then(|id| tree.get(id)))
                    .map(|entry| entry.path.clone())
            };
            (
                path_of(self.cursor),
                path_of(self.selected),
                path_of(self.marked),
            )
        };

        self.cursor = cursor_path
            .and_then(|p| tree.find_by_path(&p))
            .or(Some(tree.root()));
        self.selected = selected_path.and_then(|p| tree.find_by_path(&p));
        self.marked = marked_path.and_then(|p| tree.find_by_path(&p));
        self.pending_delete = None;
        self.tree = Some(tree);
        self.rebuild_scene();
    }
}
