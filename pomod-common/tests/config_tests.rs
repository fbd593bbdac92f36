//! Tests for root folder resolution and graceful degradation
//!
//! Note: serial_test prevents ENV variable races. Tests that touch
//! POMOD_ROOT_FOLDER are marked #[serial] so they run sequentially.

use pomod_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();
    assert!(!defaults.root_folder.as_os_str().is_empty());

    let path_str = defaults.root_folder.to_string_lossy();
    assert!(path_str.contains("pomod"), "default root should be a pomod directory");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new("test-module");
    let root_folder = resolver.resolve();

    assert!(!root_folder.as_os_str().is_empty());
    // With nothing configured, resolution lands on the compiled default
    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_overrides_default() {
    let test_path = "/tmp/pomod-test-env-folder";
    env::set_var(ROOT_FOLDER_ENV, test_path);

    let resolver = RootFolderResolver::new("test-module");
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, PathBuf::from(test_path));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_override_beats_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/pomod-test-env-folder");

    let cli_path = PathBuf::from("/tmp/pomod-test-cli-folder");
    let resolver =
        RootFolderResolver::new("test-module").with_cli_override(Some(cli_path.clone()));

    assert_eq!(resolver.resolve(), cli_path);

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_initializer_creates_directory_and_names_database() {
    let temp = tempfile::tempdir().expect("should create temp dir");
    let root = temp.path().join("nested").join("pomod-root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer
        .ensure_directory_exists()
        .expect("should create nested directories");

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("pomod.db"));
}

#[test]
fn test_initializer_is_idempotent() {
    let temp = tempfile::tempdir().expect("should create temp dir");
    let root = temp.path().to_path_buf();

    let initializer = RootFolderInitializer::new(root);
    initializer.ensure_directory_exists().expect("first call");
    initializer.ensure_directory_exists().expect("second call on existing dir");
}
