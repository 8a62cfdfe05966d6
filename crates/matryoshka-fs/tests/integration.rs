use matryoshka_fs::{StageOptions, StagedFile, ensure_dir};
use tempfile::tempdir;

#[test]
fn test_stage_into_nested_store() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("store");
    ensure_dir(root.join("text")).unwrap();

    let staged = StagedFile::new_in(&root, StageOptions::new()).unwrap();
    std::fs::write(staged.path(), b"hi\n").unwrap();
    staged.commit(root.join("text").join("key")).unwrap();

    assert_eq!(std::fs::read(root.join("text/key")).unwrap(), b"hi\n");
    let leftovers: Vec<_> = std::fs::read_dir(&root)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp~"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_identical_commits_are_idempotent() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("same");

    for _ in 0..3 {
        let staged = StagedFile::new_in(dir.path(), StageOptions::new()).unwrap();
        std::fs::write(staged.path(), b"identical").unwrap();
        staged.commit(&dest).unwrap();
    }

    assert_eq!(std::fs::read(&dest).unwrap(), b"identical");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
