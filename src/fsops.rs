use crate::model::{FileEntry, FileTree, NodeId};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::SystemTime;
use thiserror::Error;

/// The first two levels of a fresh scan start expanded.
const AUTO_EXPAND_DEPTH: usize = 2;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Copy,
    Move,
    Delete,
}

impl OpKind {
    pub fn label(self) -> &'static str {
        match self {
            OpKind::Copy => "copy",
            OpKind::Move => "move",
            OpKind::Delete => "delete",
        }
    }
}

#[derive(Debug)]
pub struct OpOutcome {
    pub kind: OpKind,
    pub source: PathBuf,
    pub result: Result<(), String>,
}

/// Events reported back from worker threads, polled once per frame.
pub enum WorkerEvent {
    ScanFinished(Result<FileTree, String>),
    OpFinished {
        outcome: OpOutcome,
        /// Fresh whole-tree snapshot after a successful operation; the app
        /// replaces its tree with it (no partial patching).
        tree: Option<FileTree>,
    },
}

/// Map a tree-virtual path (root = `/`) back onto the granted directory.
pub fn real_path(scan_root: &Path, virtual_path: &str) -> PathBuf {
    scan_root.join(virtual_path.trim_start_matches('/'))
}

/// Read `root` into a file tree: depth-capped, entry-budgeted, children
/// sorted directories-first. The first two levels start expanded.
pub fn scan_directory(root: &Path, max_depth: usize, limit: usize) -> Result<FileTree, ScanError> {
    let metadata = fs::metadata(root)?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut tree = FileTree::new(
        FileEntry::directory(name, "/", true).with_modified(modified_of(&metadata)),
    );

    let mut budget = limit;
    let root_id = tree.root();
    read_children(&mut tree, root_id, root, "", 1, max_depth, &mut budget)?;
    Ok(tree)
}

fn read_children(
    tree: &mut FileTree,
    parent: NodeId,
    dir: &Path,
    parent_virtual: &str,
    depth: usize,
    max_depth: usize,
    budget: &mut usize,
) -> Result<(), ScanError> {
    if depth > max_depth {
        return Ok(());
    }

    let mut entries: Vec<(String, PathBuf, fs::Metadata)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        // unreadable entries are skipped, not fatal
        if let Ok(metadata) = entry.metadata() {
            entries.push((name, entry.path(), metadata));
        }
    }
    entries.sort_by(|a, b| {
        b.2.is_dir()
            .cmp(&a.2.is_dir())
            .then_with(|| a.0.cmp(&b.0))
    });

    for (name, path, metadata) in entries {
        if *budget == 0 {
            return Ok(());
        }
        *budget -= 1;

        let virtual_path = format!("{parent_virtual}/{name}");
        if metadata.is_dir() {
            let id = tree.add_child(
                parent,
                FileEntry::directory(&name, &virtual_path, depth < AUTO_EXPAND_DEPTH)
                    .with_modified(modified_of(&metadata)),
            );
            read_children(tree, id, &path, &virtual_path, depth + 1, max_depth, budget)?;
        } else {
            tree.add_child(
                parent,
                FileEntry::file(&name, &virtual_path, metadata.len())
                    .with_modified(modified_of(&metadata)),
            );
        }
    }
    Ok(())
}

fn modified_of(metadata: &fs::Metadata) -> SystemTime {
    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Execute one filesystem operation synchronously. Copy and move need a
/// target directory; delete ignores it. Nothing is mutated optimistically,
/// so a failure needs no rollback.
pub fn perform_operation(
    kind: OpKind,
    source: &Path,
    target_dir: Option<&Path>,
) -> io::Result<()> {
    match kind {
        OpKind::Delete => {
            if fs::metadata(source)?.is_dir() {
                fs::remove_dir_all(source)
            } else {
                fs::remove_file(source)
            }
        }
        OpKind::Copy | OpKind::Move => {
            let target_dir = target_dir.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "target directory required")
            })?;
            let file_name = source.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "source has no file name")
            })?;
            let destination = target_dir.join(file_name);
            if destination == source {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "source and destination are the same",
                ));
            }

            if kind == OpKind::Copy {
                copy_recursive(source, &destination)
            } else {
                // rename first; fall back to copy+delete across filesystems
                match fs::rename(source, &destination) {
                    Ok(()) => Ok(()),
                    Err(_) => {
                        copy_recursive(source, &destination)?;
                        perform_operation(OpKind::Delete, source, None)
                    }
                }
            }
        }
    }
}

fn copy_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    if fs::metadata(source)?.is_dir() {
        fs::create_dir_all(destination)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &destination.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(source, destination).map(|_| ())
    }
}

/// Scan on a worker thread; the result arrives as a [`WorkerEvent`].
pub fn spawn_scan(root: PathBuf, max_depth: usize, limit: usize, tx: Sender<WorkerEvent>) {
    thread::spawn(move || {
        let result = scan_directory(&root, max_depth, limit).map_err(|e| e.to_string());
        let _ = tx.send(WorkerEvent::ScanFinished(result));
    });
}

/// Run one operation on a worker thread, then rescan the granted root so the
/// app can swap in a fresh snapshot. The render loop keeps running while
/// this is in flight; nothing prevents a second operation from starting
/// before the first resolves (known gap), and there is no cancellation.
pub fn spawn_operation(
    kind: OpKind,
    source: PathBuf,
    target_dir: Option<PathBuf>,
    rescan_root: PathBuf,
    max_depth: usize,
    limit: usize,
    tx: Sender<WorkerEvent>,
) {
    thread::spawn(move || {
        let result = perform_operation(kind, &source, target_dir.as_deref())
            .map_err(|e| e.to_string());
        let tree = if result.is_ok() {
            scan_directory(&rescan_root, max_depth, limit).ok()
        } else {
            None
        };
        let _ = tx.send(WorkerEvent::OpFinished {
            outcome: OpOutcome { kind, source, result },
            tree,
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        write!(file, "{content}").unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::create_dir(dir.path().join("docs/deep")).unwrap();
        touch(&dir.path().join("a.md"), "alpha");
        touch(&dir.path().join("docs/b.txt"), "bravo");
        touch(&dir.path().join("docs/deep/c.log"), "charlie");
        dir
    }

    #[test]
    fn scan_reads_the_tree_and_expands_top_levels() {
        let dir = fixture();
        let tree = scan_directory(dir.path(), 3, 500).unwrap();

        // root + docs + deep + 3 files
        assert_eq!(tree.count(), 6);
        assert!(tree.get(tree.root()).unwrap().is_expanded);

        let docs = tree.find_by_path("/docs").unwrap();
        assert!(tree.get(docs).unwrap().is_expanded, "level 1 auto-expands");
        let deep = tree.find_by_path("/docs/deep").unwrap();
        assert!(!tree.get(deep).unwrap().is_expanded, "level 2 starts collapsed");

        let file = tree.find_by_path("/docs/b.txt").unwrap();
        assert_eq!(tree.get(file).unwrap().size, 5);
    }

    #[test]
    fn scan_sorts_directories_first() {
        let dir = fixture();
        let tree = scan_directory(dir.path(), 3, 500).unwrap();
        let names: Vec<String> = tree
            .children(tree.root())
            .map(|id| tree.get(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["docs".to_string(), "a.md".to_string()]);
    }

    #[test]
    fn scan_respects_the_depth_cap() {
        let dir = fixture();
        let tree = scan_directory(dir.path(), 2, 500).unwrap();
        assert!(tree.find_by_path("/docs/deep").is_some());
        assert!(tree.find_by_path("/docs/deep/c.log").is_none());
    }

    #[test]
    fn scan_respects_the_entry_budget() {
        let dir = TempDir::new().unwrap();
        for i in 0..10 {
            touch(&dir.path().join(format!("f{i}.txt")), "x");
        }
        let tree = scan_directory(dir.path(), 3, 4).unwrap();
        assert_eq!(tree.count(), 5); // root + 4 budgeted entries
    }

    #[test]
    fn scan_rejects_files() {
        let dir = fixture();
        let err = scan_directory(&dir.path().join("a.md"), 3, 500);
        assert!(matches!(err, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn real_path_maps_virtual_paths_onto_the_grant() {
        let root = Path::new("/granted");
        assert_eq!(real_path(root, "/"), PathBuf::from("/granted/"));
        assert_eq!(
            real_path(root, "/docs/b.txt"),
            PathBuf::from("/granted/docs/b.txt")
        );
    }

    #[test]
    fn copy_duplicates_a_file() {
        let dir = fixture();
        let target = dir.path().join("docs");
        perform_operation(OpKind::Copy, &dir.path().join("a.md"), Some(&target)).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(target.join("a.md")).unwrap(), "alpha");
    }

    #[test]
    fn move_relocates_a_file() {
        let dir = fixture();
        let target = dir.path().join("docs");
        perform_operation(OpKind::Move, &dir.path().join("a.md"), Some(&target)).unwrap();

        assert!(!dir.path().join("a.md").exists());
        assert_eq!(fs::read_to_string(target.join("a.md")).unwrap(), "alpha");
    }

    #[test]
    fn delete_removes_files_and_directories() {
        let dir = fixture();
        perform_operation(OpKind::Delete, &dir.path().join("a.md"), None).unwrap();
        assert!(!dir.path().join("a.md").exists());

        perform_operation(OpKind::Delete, &dir.path().join("docs"), None).unwrap();
        assert!(!dir.path().join("docs").exists());
    }

    #[test]
    fn copy_of_a_directory_is_recursive() {
        let dir = fixture();
        let target = dir.path().join("backup");
        fs::create_dir(&target).unwrap();
        perform_operation(OpKind::Copy, &dir.path().join("docs"), Some(&target)).unwrap();

        assert_eq!(
            fs::read_to_string(target.join("docs/deep/c.log")).unwrap(),
            "charlie"
        );
    }

    #[test]
    fn copy_onto_itself_is_rejected() {
        let dir = fixture();
        let err = perform_operation(OpKind::Copy, &dir.path().join("a.md"), Some(dir.path()));
        assert!(err.is_err());
        // and the original is untouched
        assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), "alpha");
    }

    #[test]
    fn failed_operation_reports_without_side_effects() {
        let dir = fixture();
        let err = perform_operation(OpKind::Delete, &dir.path().join("missing.txt"), None);
        assert!(err.is_err());
    }

    #[test]
    fn spawned_operation_reports_outcome_and_fresh_tree() {
        let dir = fixture();
        let (tx, rx) = std::sync::mpsc::channel();
        spawn_operation(
            OpKind::Delete,
            dir.path().join("a.md"),
            None,
            dir.path().to_path_buf(),
            3,
            500,
            tx,
        );

        match rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap() {
            WorkerEvent::OpFinished { outcome, tree } => {
                assert!(outcome.result.is_ok());
                let tree = tree.expect("successful op rescans");
                assert!(tree.find_by_path("/a.md").is_none());
            }
            _ => panic!("unexpected worker event"),
        }
    }
}
