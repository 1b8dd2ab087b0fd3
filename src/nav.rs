use crate::camera::{Camera, Viewport};
use crate::model::NodeId;
use crate::scene::SceneNode;

/// A click selects the closest projected node within this many virtual
/// pixels; anything farther leaves the selection unchanged.
pub const HIT_RADIUS: f32 = 30.0;
/// A node qualifies for directed navigation once its screen-space offset
/// exceeds this many virtual pixels along the primary axis.
pub const DIRECTION_THRESHOLD: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Nearest-node hit test at a click point. Projects every node's animated
/// position, drops anything failing the scale threshold, and picks the
/// closest within [`HIT_RADIUS`]; ties go to the first node in iteration
/// order (strict comparison).
pub fn hit_test(
    scene: &[SceneNode],
    camera: &Camera,
    viewport: Viewport,
    time: f32,
    click_x: f32,
    click_y: f32,
) -> Option<NodeId> {
    let mut closest: Option<NodeId> = None;
    let mut closest_distance = f32::INFINITY;

    for node in scene {
        let Some(projected) = camera.project(node.animated_position(time), viewport) else {
            continue;
        };
        if !projected.is_visible() {
            continue;
        }
        let distance = ((projected.x - click_x).powi(2) + (projected.y - click_y).powi(2)).sqrt();
        if distance < HIT_RADIUS && distance < closest_distance {
            closest_distance = distance;
            closest = Some(node.file_id);
        }
    }

    closest
}

/// Directed spatial navigation: from the cursor node's projected position,
/// find the visible node whose screen offset is predominantly in
/// `direction`, minimizing |orthogonal offset| + |primary offset|, a
/// Manhattan-like score that favors alignment over raw proximity. Returns
/// `None` (cursor unchanged) when nothing qualifies.
pub fn neighbor_in_direction(
    scene: &[SceneNode],
    camera: &Camera,
    viewport: Viewport,
    cursor: NodeId,
    direction: Direction,
) -> Option<NodeId> {
    let current = scene.iter().find(|node| node.file_id == cursor)?;
    let origin = camera.project(current.position, viewport)?;

    let mut best: Option<NodeId> = None;
    let mut best_score = f32::INFINITY;

    for node in scene {
        if node.file_id == cursor {
            continue;
        }
        let Some(projected) = camera.project(node.position, viewport) else {
            continue;
        };
        if !projected.is_visible() {
            continue;
        }

        let dx = projected.x - origin.x;
        let dy = projected.y - origin.y;

        let (qualifies, score) = match direction {
            Direction::Up => (dy < -DIRECTION_THRESHOLD, dx.abs() + (-dy)),
            Direction::Down => (dy > DIRECTION_THRESHOLD, dx.abs() + dy),
            Direction::Left => (dx < -DIRECTION_THRESHOLD, dy.abs() + (-dx)),
            Direction::Right => (dx > DIRECTION_THRESHOLD, dy.abs() + dx),
        };

        if qualifies && score < best_score {
            best_score = score;
            best = Some(node.file_id);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileEntry, FileTree};
    use crate::scene::SceneNode;
    use glam::Vec3;

    // A flat camera at the origin so world x/y map directly onto screen
    // offsets: +x goes right, +y goes up (screen y shrinks).
    fn flat_camera() -> Camera {
        Camera {
            position: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            ..Camera::default()
        }
    }

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 1000.0,
    };

    fn test_scene(positions: &[Vec3]) -> (FileTree, Vec<SceneNode>) {
        let mut tree = FileTree::new(FileEntry::directory("root", "/", true));
        let mut scene = Vec::new();
        for (i, position) in positions.iter().enumerate() {
            let id = tree.add_child(
                tree.root(),
                FileEntry::file(format!("n{i}"), format!("/n{i}"), 1),
            );
            scene.push(SceneNode {
                glyph: "●",
                color: (200, 200, 200),
                position: *position,
                is_root: false,
                shimmer_phase: 0.0,
                hover_phase: 0.0,
                file_id: id,
                depth: 1,
                parent_position: None,
                is_special: false,
            });
        }
        (tree, scene)
    }

    #[test]
    fn click_selects_the_nearest_node_within_radius() {
        let camera = flat_camera();
        let (_tree, scene) = test_scene(&[
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(1.0, 0.0, 4.0),
        ]);

        let target = camera.project(scene[1].position, VIEWPORT).unwrap();
        let hit = hit_test(&scene, &camera, VIEWPORT, 0.0, target.x + 5.0, target.y);
        assert_eq!(hit, Some(scene[1].file_id));
    }

    #[test]
    fn click_outside_hit_radius_selects_nothing() {
        let camera = flat_camera();
        let (_tree, scene) = test_scene(&[Vec3::new(0.0, 0.0, 4.0)]);

        let projected = camera.project(scene[0].position, VIEWPORT).unwrap();
        let miss = hit_test(
            &scene,
            &camera,
            VIEWPORT,
            0.0,
            projected.x + HIT_RADIUS + 1.0,
            projected.y,
        );
        assert_eq!(miss, None);
    }

    #[test]
    fn hit_test_ties_break_to_first_in_iteration_order() {
        let camera = flat_camera();
        // two nodes projected to the same screen point
        let (_tree, scene) = test_scene(&[
            Vec3::new(0.5, 0.5, 4.0),
            Vec3::new(0.5, 0.5, 4.0),
        ]);
        let projected = camera.project(scene[0].position, VIEWPORT).unwrap();
        let hit = hit_test(&scene, &camera, VIEWPORT, 0.0, projected.x, projected.y);
        assert_eq!(hit, Some(scene[0].file_id));
    }

    #[test]
    fn hit_test_skips_nodes_behind_the_camera() {
        let camera = flat_camera();
        let (_tree, scene) = test_scene(&[Vec3::new(0.0, 0.0, -30.0)]);
        // a far-behind node projects near the viewport center mirrored;
        // whatever its screen position, it must never be clickable
        for x in [0, 250, 500, 750, 1000] {
            for y in [0, 500, 1000] {
                assert_eq!(
                    hit_test(&scene, &camera, VIEWPORT, 0.0, x as f32, y as f32),
                    None
                );
            }
        }
    }

    #[test]
    fn navigate_right_picks_the_aligned_neighbor() {
        let camera = flat_camera();
        // cursor at center; one node to the right, one above-right
        let (_tree, scene) = test_scene(&[
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(1.0, 0.0, 4.0),
            Vec3::new(1.0, 0.8, 4.0),
        ]);

        let next = neighbor_in_direction(&scene, &camera, VIEWPORT, scene[0].file_id, Direction::Right);
        assert_eq!(next, Some(scene[1].file_id), "alignment beats proximity");
    }

    #[test]
    fn navigate_up_from_topmost_leaves_cursor_unchanged() {
        let camera = flat_camera();
        // world +y projects to smaller screen y, so n1 is the topmost
        let (_tree, scene) = test_scene(&[
            Vec3::new(0.0, 1.0, 4.0),
            Vec3::new(0.0, 0.0, 4.0),
        ]);

        let next = neighbor_in_direction(&scene, &camera, VIEWPORT, scene[0].file_id, Direction::Up);
        assert_eq!(next, None);
    }

    #[test]
    fn small_offsets_below_threshold_do_not_qualify() {
        let camera = flat_camera();
        // ~0.05 world units is a handful of virtual pixels at this distance
        let (_tree, scene) = test_scene(&[
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(0.05, 0.0, 4.0),
        ]);

        let next = neighbor_in_direction(&scene, &camera, VIEWPORT, scene[0].file_id, Direction::Right);
        assert_eq!(next, None);
    }

    #[test]
    fn navigation_ignores_nodes_failing_the_scale_threshold() {
        let camera = flat_camera();
        let (_tree, scene) = test_scene(&[
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(2.0, 0.0, -30.0),
        ]);
        let next = neighbor_in_direction(&scene, &camera, VIEWPORT, scene[0].file_id, Direction::Right);
        assert_eq!(next, None);
    }
}
