// tests/resolve_real_fs.rs

#![cfg(unix)]

use procrun::ExecutableResolver;
use procrun::fs::RealFileSystem;
use procrun_test_utils::fixtures::write_script;

#[test]
fn search_roots_find_a_file_on_disk() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let script = write_script(second.path(), "procrun-fixture-tool", "echo hi").unwrap();
    let resolver = ExecutableResolver::new(RealFileSystem);

    let found = resolver
        .resolve("procrun-fixture-tool", &[first.path(), second.path()])
        .unwrap();

    assert_eq!(found, script);
    assert_eq!(resolver.cached(), 1);
}

#[test]
fn directories_are_not_executables() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("not-a-tool")).unwrap();
    let resolver = ExecutableResolver::new(RealFileSystem);

    assert_eq!(resolver.resolve("not-a-tool", &[root.path()]), None);
}
