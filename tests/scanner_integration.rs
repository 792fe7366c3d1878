use std::fs;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::tempdir;
use torque_slideshow::config::WidgetConfig;
use torque_slideshow::scanner::{is_allowed, scan_directories};
use torque_slideshow::session::ClientSession;

fn exts(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn picks_only_allowed_extensions() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a");
    fs::create_dir_all(&a).unwrap();
    fs::write(a.join("x.png"), b"x").unwrap();
    fs::write(a.join("y.txt"), b"y").unwrap();

    let files = scan_directories(&[a.display().to_string()], &exts(&[".png"]), &[]);
    assert_eq!(files, vec![a.join("x.png")]);
}

#[test]
fn recursive_scan_reaches_nested_directories() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("2024").join("summer")).unwrap();
    fs::write(root.join("top.jpg"), b"x").unwrap();
    fs::write(root.join("2024").join("mid.webp"), b"x").unwrap();
    fs::write(root.join("2024").join("summer").join("deep.gif"), b"x").unwrap();
    fs::write(root.join("2024").join("summer").join("notes.md"), b"x").unwrap();

    let allowed = exts(&[".jpg", ".webp", ".gif"]);
    let mut files = scan_directories(&[root.display().to_string()], &allowed, &[]);
    files.sort();
    let mut expected = vec![
        root.join("top.jpg"),
        root.join("2024").join("mid.webp"),
        root.join("2024").join("summer").join("deep.gif"),
    ];
    expected.sort();
    assert_eq!(files, expected);
    assert!(files.iter().all(|p| is_allowed(&p.to_string_lossy(), &allowed)));
}

#[test]
fn unreadable_directory_does_not_abort_the_scan() {
    let tmp = tempdir().unwrap();
    let good = tmp.path().join("good");
    fs::create_dir_all(&good).unwrap();
    fs::write(good.join("ok.png"), b"x").unwrap();
    let missing = tmp.path().join("missing");

    let dirs = vec![
        missing.display().to_string(),
        String::new(),
        "   ".to_string(),
        good.display().to_string(),
    ];
    let files = scan_directories(&dirs, &exts(&[".png"]), &[]);
    assert_eq!(files, vec![good.join("ok.png")]);
}

#[test]
fn known_files_are_never_returned() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    for name in ["a.png", "b.png", "c.png"] {
        fs::write(root.join(name), b"x").unwrap();
    }
    let known = vec![root.join("a.png"), root.join("c.png")];

    let files = scan_directories(&[root.display().to_string()], &exts(&[".png"]), &known);
    assert_eq!(files, vec![root.join("b.png")]);

    // Incremental add: a second pass over the same tree finds nothing new.
    let mut all = known.clone();
    all.extend(files);
    let again = scan_directories(&[root.display().to_string()], &exts(&[".png"]), &all);
    assert!(again.is_empty());
}

#[test]
fn empty_directory_list_yields_nothing() {
    assert!(scan_directories(&[], &exts(&[".png"]), &[]).is_empty());
}

#[tokio::test]
async fn randomized_rebuild_is_a_uniform_permutation() {
    let tmp = tempdir().unwrap();
    let names = ["a.png", "b.png", "c.png"];
    for name in names {
        fs::write(tmp.path().join(name), name).unwrap();
    }
    let config = WidgetConfig {
        data_dir_paths: vec![tmp.path().display().to_string()],
        allowed_extensions: exts(&[".png"]),
        randomize_images: true,
        ..WidgetConfig::default()
    };
    let mut expected_files: Vec<PathBuf> = names.iter().map(|n| tmp.path().join(n)).collect();
    expected_files.sort();

    let trials: u64 = 12_000;
    // counts[file][position]
    let mut counts = [[0usize; 3]; 3];

    for seed in 0..trials {
        let mut session = ClientSession::new("w", StdRng::seed_from_u64(seed));
        assert_eq!(session.rebuild(config.clone()).await, 3);

        let order = session.files().to_vec();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(sorted, expected_files, "rebuild must yield a permutation");

        for (pos, path) in order.iter().enumerate() {
            let idx = expected_files.iter().position(|p| p == path).unwrap();
            counts[idx][pos] += 1;
        }
    }

    let expected = trials as f64 / 3.0;
    for row in counts {
        for count in row {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "position count {count} too far from {expected}");
        }
    }
}
