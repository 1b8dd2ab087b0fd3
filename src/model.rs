use indextree::Arena;
use std::time::SystemTime;

pub type NodeId = indextree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// One entry in the file tree. The arena `NodeId` is the stable unique id;
/// `path` is slash-separated and consistent with the node's position in the
/// hierarchy (caller responsibility, not re-validated here).
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub kind: FileKind,
    pub size: u64,
    pub extension: Option<String>,
    pub path: String,
    pub modified: SystemTime,
    pub is_expanded: bool,
}

impl FileEntry {
    pub fn file(name: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            name,
            kind: FileKind::File,
            size,
            extension,
            path: path.into(),
            modified: SystemTime::UNIX_EPOCH,
            is_expanded: false,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>, expanded: bool) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Directory,
            size: 0,
            extension: None,
            path: path.into(),
            modified: SystemTime::UNIX_EPOCH,
            is_expanded: expanded,
        }
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = modified;
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// Lowercased extension, or `None` for dotfiles and extension-less names.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Arena-backed file tree. Exactly one root; every other node is reachable
/// from it via children. The expansion flag is the only field mutated after
/// construction (single writer, single thread).
pub struct FileTree {
    arena: Arena<FileEntry>,
    root: NodeId,
}

impl FileTree {
    pub fn new(root_entry: FileEntry) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(root_entry);
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&FileEntry> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn add_child(&mut self, parent: NodeId, entry: FileEntry) -> NodeId {
        let child = self.arena.new_node(entry);
        parent.append(child, &mut self.arena);
        child
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Flip the expansion flag of a directory node. Files are left alone.
    pub fn toggle_expansion(&mut self, id: NodeId) {
        if let Some(node) = self.arena.get_mut(id) {
            let entry = node.get_mut();
            if entry.is_dir() {
                entry.is_expanded = !entry.is_expanded;
            }
        }
    }

    /// Expand a directory node; never collapses. Returns whether the flag
    /// actually changed (callers rebuild the scene only on change).
    pub fn expand(&mut self, id: NodeId) -> bool {
        if let Some(node) = self.arena.get_mut(id) {
            let entry = node.get_mut();
            if entry.is_dir() && !entry.is_expanded {
                entry.is_expanded = true;
                return true;
            }
        }
        false
    }

    /// Nodes reachable from the root by descending only into expanded
    /// directories. Collapsed subtrees contribute nothing.
    pub fn visible_count(&self) -> usize {
        let mut count = 0;
        self.visit_visible(|_, _| count += 1);
        count
    }

    pub fn visit_visible(&self, mut f: impl FnMut(NodeId, usize)) {
        fn walk(tree: &FileTree, id: NodeId, depth: usize, f: &mut impl FnMut(NodeId, usize)) {
            f(id, depth);
            let entry = match tree.get(id) {
                Some(entry) => entry,
                None => return,
            };
            if entry.is_dir() && entry.is_expanded {
                let children: Vec<NodeId> = tree.children(id).collect();
                for child in children {
                    walk(tree, child, depth + 1, f);
                }
            }
        }
        walk(self, self.root, 0, &mut f);
    }

    /// All node ids, depth-first from the root (expansion-independent).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root.descendants(&self.arena)
    }

    /// Depth-first path lookup, used to re-anchor the navigation cursor when
    /// the whole tree snapshot is replaced after a filesystem operation.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.arena)
            .find(|id| self.get(*id).map(|e| e.path.as_str()) == Some(path))
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.arena)
            .find(|id| self.get(*id).map(|e| e.name.as_str()) == Some(name))
    }

    pub fn count(&self) -> usize {
        self.arena.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> FileTree {
        let mut tree = FileTree::new(FileEntry::directory("root", "/", true));
        let docs = tree.add_child(tree.root(), FileEntry::directory("docs", "/docs", true));
        tree.add_child(docs, FileEntry::file("a.md", "/docs/a.md", 10));
        let sub = tree.add_child(docs, FileEntry::directory("sub", "/docs/sub", false));
        tree.add_child(sub, FileEntry::file("hidden.txt", "/docs/sub/hidden.txt", 5));
        tree
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("Photo.JPG"), Some("jpg".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of(".gitignore"), None);
    }

    #[test]
    fn visible_count_skips_collapsed_subtrees() {
        let tree = small_tree();
        // root, docs, a.md, sub; hidden.txt sits behind a collapsed dir
        assert_eq!(tree.visible_count(), 4);
        assert_eq!(tree.count(), 5);
    }

    #[test]
    fn toggle_expansion_round_trips() {
        let mut tree = small_tree();
        let sub = tree.find_by_name("sub").unwrap();
        let snapshot = |tree: &FileTree| -> Vec<(String, bool)> {
            let mut out = Vec::new();
            tree.visit_visible(|id, _| {
                let e = tree.get(id).unwrap();
                out.push((e.path.clone(), e.is_expanded));
            });
            out
        };
        let before = snapshot(&tree);

        tree.toggle_expansion(sub);
        assert!(tree.get(sub).unwrap().is_expanded);
        assert_eq!(tree.visible_count(), 5);

        tree.toggle_expansion(sub);
        assert_eq!(snapshot(&tree), before);
        assert_eq!(tree.visible_count(), 4);
    }

    #[test]
    fn toggle_expansion_ignores_files() {
        let mut tree = small_tree();
        let file = tree.find_by_name("a.md").unwrap();
        tree.toggle_expansion(file);
        assert!(!tree.get(file).unwrap().is_expanded);
    }

    #[test]
    fn expand_never_collapses() {
        let mut tree = small_tree();
        let docs = tree.find_by_name("docs").unwrap();
        assert!(!tree.expand(docs), "already-expanded dir reports no change");
        assert!(tree.get(docs).unwrap().is_expanded);
    }

    #[test]
    fn find_by_path_resolves_nested_nodes() {
        let tree = small_tree();
        let id = tree.find_by_path("/docs/sub/hidden.txt").unwrap();
        assert_eq!(tree.get(id).unwrap().name, "hidden.txt");
        assert!(tree.find_by_path("/nope").is_none());
    }
}
