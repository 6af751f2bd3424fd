//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Build `demos/example-plugin` once per test binary and return the cdylib path
pub fn example_plugin() -> &'static Path {
    static PLUGIN: OnceLock<PathBuf> = OnceLock::new();

    PLUGIN.get_or_init(|| {
        let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("plugins");
        let status = Command::new(env!("CARGO"))
            .args(["build", "--quiet", "-p", "example-plugin", "--target-dir"])
            .arg(&target_dir)
            .current_dir(env!("CARGO_MANIFEST_DIR"))
            .status()
            .expect("Failed to run cargo");
        assert!(status.success(), "Building example-plugin failed");

        let path = target_dir
            .join("debug")
            .join(plugin_loader::library_filename("example_plugin"));
        assert!(path.exists(), "Missing plugin artifact {}", path.display());
        path
    })
}

/// The facade singleton is process-wide: tests sharing the library must not overlap.
pub fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
