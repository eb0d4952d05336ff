use tempfile::TempDir;

use crate::cli::commands::specfile::upstream_url;
use crate::cli::error::CliError;

#[test]
fn test_upstream_url_expands_macros() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tmux.spec");
    std::fs::write(
        &path,
        "Name: tmux\nVersion: 3.4\nURL: https://github.com/%{name}/%{name}\n\n%prep\n",
    )
    .unwrap();

    assert_eq!(
        upstream_url(&path).unwrap(),
        "https://github.com/tmux/tmux"
    );
}

#[test]
fn test_upstream_url_missing_file() {
    let dir = TempDir::new().unwrap();

    let err = upstream_url(&dir.path().join("missing.spec")).unwrap_err();
    assert!(matches!(err, CliError::Specfile(_)));
}
