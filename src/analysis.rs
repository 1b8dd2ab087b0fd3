use crate::model::{FileKind, FileTree};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

/// Simulated round-trip latency of the (entirely mocked) analysis backend.
pub const MOCK_LATENCY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterKind {
    SimilarImages,
    RelatedContent,
}

#[derive(Debug, Clone)]
pub struct ContentCluster {
    pub name: String,
    pub kind: ClusterKind,
    pub confidence: f32,
    pub paths: Vec<String>,
}

/// The file metadata the analysis service sees; nothing else leaves the app.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub path: String,
    pub extension: Option<String>,
}

pub fn collect_facts(tree: &FileTree) -> Vec<FileFacts> {
    tree.ids()
        .filter_map(|id| {
            let entry = tree.get(id)?;
            (entry.kind == FileKind::File).then(|| FileFacts {
                path: entry.path.clone(),
                extension: entry.extension.clone(),
            })
        })
        .collect()
}

/// Mock clustering: groups by media category, with canned confidences.
/// Network-shaped but local; swap for a real backend behind the same
/// function signature.
pub fn cluster_content(facts: &[FileFacts]) -> Vec<ContentCluster> {
    let with_extension = |exts: &[&str]| -> Vec<String> {
        facts
            .iter()
            .filter(|f| {
                f.extension
                    .as_deref()
                    .map(|ext| exts.contains(&ext))
                    .unwrap_or(false)
            })
            .map(|f| f.path.clone())
            .collect()
    };

    let mut clusters = Vec::new();

    let images = with_extension(&["jpg", "jpeg", "png", "gif"]);
    if images.len() > 1 {
        clusters.push(ContentCluster {
            name: "Similar Images".to_string(),
            kind: ClusterKind::SimilarImages,
            confidence: 0.85,
            paths: images,
        });
    }

    let videos = with_extension(&["mp4", "avi", "mov"]);
    if videos.len() > 1 {
        clusters.push(ContentCluster {
            name: "Video Collection".to_string(),
            kind: ClusterKind::RelatedContent,
            confidence: 0.75,
            paths: videos,
        });
    }

    clusters
}

/// Run the mock clustering on a worker thread after the simulated latency;
/// the result arrives on `tx` and is polled by the frame loop.
pub fn spawn_clustering(facts: Vec<FileFacts>, tx: Sender<Vec<ContentCluster>>) {
    thread::spawn(move || {
        thread::sleep(MOCK_LATENCY);
        let _ = tx.send(cluster_content(&facts));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_tree;

    #[test]
    fn facts_cover_all_files_regardless_of_expansion() {
        let tree = sample_tree();
        let facts = collect_facts(&tree);
        // 11 files in the sample tree, most behind collapsed directories
        assert_eq!(facts.len(), 11);
        assert!(facts.iter().any(|f| f.path == "/Media/Photos/vacation.jpg"));
    }

    #[test]
    fn images_cluster_once_there_are_at_least_two() {
        let tree = sample_tree();
        let clusters = cluster_content(&collect_facts(&tree));

        let images = clusters
            .iter()
            .find(|c| c.kind == ClusterKind::SimilarImages)
            .expect("vacation.jpg and profile.png cluster");
        assert_eq!(images.paths.len(), 2);
        assert!((images.confidence - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn a_single_video_does_not_cluster() {
        let tree = sample_tree();
        let clusters = cluster_content(&collect_facts(&tree));
        assert!(clusters
            .iter()
            .all(|c| c.kind != ClusterKind::RelatedContent));
    }

    #[test]
    fn empty_metadata_yields_no_clusters() {
        assert!(cluster_content(&[]).is_empty());
    }
}
