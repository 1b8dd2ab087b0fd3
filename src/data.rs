use crate::model::{FileEntry, FileTree};
use std::time::{Duration, SystemTime};

fn day(n: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(n * 86_400)
}

/// The bundled demo tree: a small, recognizable home-directory shape so the
/// explorer has something to show before (or instead of) a real directory
/// grant. Top three levels start expanded; the leaf directories start
/// collapsed so expansion has visible effect.
pub fn sample_tree() -> FileTree {
    let mut tree = FileTree::new(
        FileEntry::directory("System", "/", true).with_modified(day(19_738)),
    );
    let root = tree.root();

    let documents = tree.add_child(
        root,
        FileEntry::directory("Documents", "/Documents", true).with_modified(day(19_737)),
    );
    let projects = tree.add_child(
        documents,
        FileEntry::directory("Projects", "/Documents/Projects", true).with_modified(day(19_736)),
    );

    let hackathon = tree.add_child(
        projects,
        FileEntry::directory("Hackathon2024", "/Documents/Projects/Hackathon2024", false)
            .with_modified(day(19_735)),
    );
    tree.add_child(
        hackathon,
        FileEntry::file("README.md", "/Documents/Projects/Hackathon2024/README.md", 2_048)
            .with_modified(day(19_735)),
    );
    tree.add_child(
        hackathon,
        FileEntry::file("app.tsx", "/Documents/Projects/Hackathon2024/app.tsx", 15_360)
            .with_modified(day(19_734)),
    );

    let portfolio = tree.add_child(
        projects,
        FileEntry::directory("Portfolio", "/Documents/Projects/Portfolio", false)
            .with_modified(day(19_733)),
    );
    tree.add_child(
        portfolio,
        FileEntry::file("index.html", "/Documents/Projects/Portfolio/index.html", 4_096)
            .with_modified(day(19_732)),
    );
    tree.add_child(
        portfolio,
        FileEntry::file("styles.css", "/Documents/Projects/Portfolio/styles.css", 8_192)
            .with_modified(day(19_731)),
    );

    let reports = tree.add_child(
        documents,
        FileEntry::directory("Reports", "/Documents/Reports", false).with_modified(day(19_730)),
    );
    tree.add_child(
        reports,
        FileEntry::file("Q4_Report.pdf", "/Documents/Reports/Q4_Report.pdf", 1_048_576)
            .with_modified(day(19_729)),
    );
    tree.add_child(
        reports,
        FileEntry::file("Data_Analysis.xlsx", "/Documents/Reports/Data_Analysis.xlsx", 524_288)
            .with_modified(day(19_728)),
    );

    let media = tree.add_child(
        root,
        FileEntry::directory("Media", "/Media", false).with_modified(day(19_727)),
    );
    let photos = tree.add_child(
        media,
        FileEntry::directory("Photos", "/Media/Photos", false).with_modified(day(19_726)),
    );
    tree.add_child(
        photos,
        FileEntry::file("vacation.jpg", "/Media/Photos/vacation.jpg", 2_097_152)
            .with_modified(day(19_725)),
    );
    tree.add_child(
        photos,
        FileEntry::file("profile.png", "/Media/Photos/profile.png", 1_048_576)
            .with_modified(day(19_724)),
    );
    let videos = tree.add_child(
        media,
        FileEntry::directory("Videos", "/Media/Videos", false).with_modified(day(19_723)),
    );
    tree.add_child(
        videos,
        FileEntry::file("demo.mp4", "/Media/Videos/demo.mp4", 52_428_800)
            .with_modified(day(19_722)),
    );

    let system = tree.add_child(
        root,
        FileEntry::directory("Settings", "/Settings", false).with_modified(day(19_721)),
    );
    tree.add_child(
        system,
        FileEntry::file("config.json", "/Settings/config.json", 1_024).with_modified(day(19_720)),
    );
    tree.add_child(
        system,
        FileEntry::file("system.log", "/Settings/system.log", 16_384).with_modified(day(19_719)),
    );

    tree
}
