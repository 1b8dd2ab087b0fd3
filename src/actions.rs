use crate::analysis;
use crate::app::{AppState, TreeSource};
use crate::data;
use crate::fsops::{self, OpKind};
use crate::model::FileKind;
use crate::nav::{self, Direction};
use anyhow::Result;
use clipboard::{ClipboardContext, ClipboardProvider};
use std::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Application control
    Quit,
    ShowHelp,
    CloseHelp,

    // Camera (deltas in virtual pixels / wheel notches)
    Rotate(f32, f32),
    Pan(f32, f32),
    Zoom(f32),
    RecenterCamera,

    // Selection and spatial navigation
    ClickAt(f32, f32),
    Navigate(Direction),
    ToggleExpandCursor,

    // Tree source
    ToggleSampleTree,

    // Filesystem operations
    DeleteCursor,
    MarkSource,
    PasteInto(OpKind),
    YankPath,

    // Analysis
    RequestAnalysis,
}

pub fn execute_action(action: Action, app: &mut AppState) -> Result<()> {
    // Any action other than a repeated Delete withdraws the pending
    // confirmation.
    if action != Action::DeleteCursor {
        app.pending_delete = None;
    }

    match action {
        Action::Quit => app.running = false,
        Action::ShowHelp => app.show_help = true,
        Action::CloseHelp => {
            app.show_help = false;
            app.clear_message();
        }

        Action::Rotate(dx, dy) => app.camera.rotate(dx, dy),
        Action::Pan(dx, dy) => app.camera.pan(dx, dy),
        Action::Zoom(notches) => app.camera.zoom(notches),
        Action::RecenterCamera => recenter_camera(app),

        Action::ClickAt(x, y) => click_select(app, x, y),
        Action::Navigate(direction) => navigate(app, direction),
        Action::ToggleExpandCursor => toggle_expand_cursor(app),

        Action::ToggleSampleTree => toggle_sample_tree(app),

        Action::DeleteCursor => delete_cursor(app),
        Action::MarkSource => mark_source(app),
        Action::PasteInto(kind) => paste_into(app, kind),
        Action::YankPath => yank_path(app),

        Action::RequestAnalysis => request_analysis(app),
    }
    Ok(())
}

fn click_select(app: &mut AppState, x: f32, y: f32) {
    let Some(viewport) = app.viewport() else {
        return;
    };
    let time = app.animation_time();
    // a miss leaves the selection unchanged
    if let Some(id) = nav::hit_test(&app.scene, &app.camera, viewport, time, x, y) {
        app.focus_node(id);
    }
}

fn navigate(app: &mut AppState, direction: Direction) {
    let (Some(viewport), Some(cursor)) = (app.viewport(), app.cursor) else {
        return;
    };
    if let Some(next) = nav::neighbor_in_direction(&app.scene, &app.camera, viewport, cursor, direction)
    {
        app.focus_node(next);
    }
}

fn toggle_expand_cursor(app: &mut AppState) {
    let Some(cursor) = app.cursor else {
        return;
    };
    let toggled = match &mut app.tree {
        Some(tree) => {
            let is_dir = tree.get(cursor).map(|e| e.is_dir()).unwrap_or(false);
            if is_dir {
                tree.toggle_expansion(cursor);
            }
            is_dir
        }
        None => false,
    };
    if toggled {
        app.rebuild_scene();
    }
}

fn recenter_camera(app: &mut AppState) {
    let Some(cursor) = app.cursor else {
        return;
    };
    if let Some(node) = app.scene_node(cursor) {
        let position = node.position;
        app.camera.recenter_behind(position);
    }
}

fn toggle_sample_tree(app: &mut AppState) {
    if app.source == TreeSource::Sample {
        app.clear_tree();
        app.set_message("Sample tree closed");
    } else {
        // demo data from the entry state or instead of a real grant
        app.set_tree(data::sample_tree(), TreeSource::Sample);
        app.set_message("Sample tree loaded");
    }
}

fn delete_cursor(app: &mut AppState) {
    let TreeSource::Real(root) = app.source.clone() else {
        app.set_message("Delete works on a real directory only");
        return;
    };
    let Some(cursor) = app.cursor else {
        return;
    };
    let Some(entry) = app.tree.as_ref().and_then(|tree| tree.get(cursor)) else {
        return;
    };
    if entry.kind != FileKind::File {
        app.set_message("Only files can be deleted from here");
        return;
    }

    if app.pending_delete != Some(cursor) {
        app.pending_delete = Some(cursor);
        app.set_message(format!("Delete {}? Press Delete again to confirm", entry.name));
        return;
    }

    let source = fsops::real_path(&root, &entry.path);
    let name = entry.name.clone();
    app.pending_delete = None;
    app.ops_in_flight += 1;
    fsops::spawn_operation(
        OpKind::Delete,
        source,
        None,
        root,
        app.config.scan_depth,
        app.config.scan_limit,
        app.worker_sender(),
    );
    app.set_message(format!("Deleting {name}…"));
}

fn mark_source(app: &mut AppState) {
    let Some(cursor) = app.cursor else {
        return;
    };
    let Some(entry) = app.tree.as_ref().and_then(|tree| tree.get(cursor)) else {
        return;
    };
    app.marked = Some(cursor);
    app.set_message(format!("Marked {} (p: copy here, v: move here)", entry.name));
}

fn paste_into(app: &mut AppState, kind: OpKind) {
    let TreeSource::Real(root) = app.source.clone() else {
        app.set_message("Copy/move work on a real directory only");
        return;
    };
    let Some(marked) = app.marked else {
        app.set_message("Nothing marked; press m on a node first");
        return;
    };
    let source_info = app
        .tree
        .as_ref()
        .and_then(|tree| tree.get(marked))
        .map(|entry| (entry.path.clone(), entry.name.clone()));
    let target_info = app
        .cursor
        .and_then(|cursor| app.tree.as_ref().and_then(|tree| tree.get(cursor)))
        .map(|entry| (entry.path.clone(), entry.name.clone(), entry.kind));

    let Some((source_path, source_name)) = source_info else {
        app.set_message("Marked node no longer exists");
        app.marked = None;
        return;
    };
    let Some((target_path, target_name, target_kind)) = target_info else {
        return;
    };
    if target_kind != FileKind::Directory {
        app.set_message("Target must be a directory");
        return;
    }

    let source = fsops::real_path(&root, &source_path);
    let target = fsops::real_path(&root, &target_path);
    let description = format!("{} {} → {}", kind.label(), source_name, target_name);
    app.ops_in_flight += 1;
    if kind == OpKind::Move {
        app.marked = None;
    }
    fsops::spawn_operation(
        kind,
        source,
        Some(target),
        root,
        app.config.scan_depth,
        app.config.scan_limit,
        app.worker_sender(),
    );
    app.set_message(format!("{description}…"));
}

fn yank_path(app: &mut AppState) {
    let Some(entry) = app
        .cursor
        .and_then(|cursor| app.tree.as_ref().and_then(|tree| tree.get(cursor)))
    else {
        return;
    };
    let path = entry.path.clone();
    match ClipboardContext::new() {
        Ok(mut ctx) => {
            let _ = ctx.set_contents(path.clone());
            app.set_message(format!("Yanked {path}"));
        }
        Err(error) => app.set_message(format!("Clipboard unavailable: {error}")),
    }
}

fn request_analysis(app: &mut AppState) {
    let Some(tree) = &app.tree else {
        app.set_message("Nothing to analyze");
        return;
    };
    if app.analysis_rx.is_some() {
        app.set_message("Analysis already running");
        return;
    }
    let facts = analysis::collect_facts(tree);
    let (tx, rx) = mpsc::channel();
    analysis::spawn_clustering(facts, tx);
    app.analysis_rx = Some(rx);
    app.set_message("Requesting content clusters…");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::AppConfig;
    use ratatui::layout::Rect;

    fn sample_app() -> AppState {
        let mut app = AppState::new(AppConfig::default());
        execute_action(Action::ToggleSampleTree, &mut app).unwrap();
        app.scene_area = Some(Rect::new(0, 0, 120, 40));
        app
    }

    #[test]
    fn sample_toggle_round_trips_to_entry_state() {
        let mut app = AppState::new(AppConfig::default());
        execute_action(Action::ToggleSampleTree, &mut app).unwrap();
        assert_eq!(app.source, TreeSource::Sample);
        assert!(app.tree.is_some());

        execute_action(Action::ToggleSampleTree, &mut app).unwrap();
        assert_eq!(app.source, TreeSource::None);
        assert!(app.tree.is_none());
    }

    #[test]
    fn enter_toggles_cursor_directory_expansion() {
        let mut app = sample_app();
        let media = app.tree.as_ref().unwrap().find_by_name("Media").unwrap();
        app.cursor = Some(media);
        let before = app.scene.len();

        execute_action(Action::ToggleExpandCursor, &mut app).unwrap();
        assert_eq!(app.scene.len(), before + 2);

        execute_action(Action::ToggleExpandCursor, &mut app).unwrap();
        assert_eq!(app.scene.len(), before);
    }

    #[test]
    fn delete_in_sample_mode_is_refused() {
        let mut app = sample_app();
        let readme = app.tree.as_ref().unwrap().find_by_name("README.md");
        app.cursor = readme;
        execute_action(Action::DeleteCursor, &mut app).unwrap();
        assert!(app.message.as_deref().unwrap().contains("real directory"));
        assert_eq!(app.pending_delete, None);
    }

    #[test]
    fn delete_requires_a_second_confirmation_press() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("victim.txt"), "x").unwrap();

        let mut app = AppState::new(AppConfig::default());
        let tree = fsops::scan_directory(dir.path(), 3, 500).unwrap();
        app.set_tree(tree, TreeSource::Real(dir.path().to_path_buf()));
        let victim = app
            .tree
            .as_ref()
            .unwrap()
            .find_by_path("/victim.txt")
            .unwrap();
        app.cursor = Some(victim);

        execute_action(Action::DeleteCursor, &mut app).unwrap();
        assert_eq!(app.pending_delete, Some(victim));
        assert!(dir.path().join("victim.txt").exists(), "first press only arms");

        // an unrelated action withdraws the confirmation
        execute_action(Action::Zoom(1.0), &mut app).unwrap();
        assert_eq!(app.pending_delete, None);
    }

    #[test]
    fn delete_refuses_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("keep")).unwrap();

        let mut app = AppState::new(AppConfig::default());
        let tree = fsops::scan_directory(dir.path(), 3, 500).unwrap();
        app.set_tree(tree, TreeSource::Real(dir.path().to_path_buf()));
        let keep = app.tree.as_ref().unwrap().find_by_path("/keep").unwrap();
        app.cursor = Some(keep);

        execute_action(Action::DeleteCursor, &mut app).unwrap();
        execute_action(Action::DeleteCursor, &mut app).unwrap();
        assert!(dir.path().join("keep").exists());
    }

    #[test]
    fn rotate_and_zoom_mutate_the_camera() {
        let mut app = sample_app();
        let yaw = app.camera.yaw;
        execute_action(Action::Rotate(50.0, 0.0), &mut app).unwrap();
        assert!(app.camera.yaw > yaw);

        let position = app.camera.position;
        execute_action(Action::Zoom(1.0), &mut app).unwrap();
        assert_ne!(app.camera.position, position);
    }

    #[test]
    fn recenter_places_camera_near_the_cursor_node() {
        let mut app = sample_app();
        execute_action(Action::RecenterCamera, &mut app).unwrap();
        let root_node = app.scene.iter().find(|n| n.is_root).unwrap();
        let distance = (app.camera.position - root_node.position).length();
        assert!(distance < 2.0, "camera hovers close behind the node");
    }

    #[test]
    fn click_far_from_everything_keeps_selection() {
        let mut app = sample_app();
        let media = app.tree.as_ref().unwrap().find_by_name("Media").unwrap();
        app.focus_node(media);
        assert_eq!(app.selected, Some(media));

        // the corner of the viewport is nowhere near a projected node
        execute_action(Action::ClickAt(2.0, 2.0), &mut app).unwrap();
        assert_eq!(app.selected, Some(media));
        assert_eq!(app.cursor, Some(media));
    }

    #[test]
    fn paste_without_mark_reports_and_does_nothing(){
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = AppState::new(AppConfig::default());
        let tree = fsops::scan_directory(dir.path(), 3, 500).unwrap();
        app.set_tree(tree, TreeSource::Real(dir.path().to_path_buf()));

        execute_action(Action::PasteInto(OpKind::Copy), &mut app).unwrap();
        assert!(app.message.as_deref().unwrap().contains("Nothing marked"));
        assert_eq!(app.ops_in_flight, 0);
    }
}
