//! Moves dependency files into the relocation subdirectory.

use crate::fs_util::{ensure_dir_exists, path_exists, remove_if_empty};
use camino::{Utf8Component, Utf8Path};
use fs_err as fs;
use pubtidy_types::names::{BOOTSTRAP_FRAGMENTS, SIDECAR_EXTENSIONS};
use pubtidy_types::report::RelocationReport;
use tracing::{debug, error, info};

/// Files that must stay beside the entry point.
pub fn is_pinned(file: &str, main_program: &str) -> bool {
    (!main_program.is_empty() && file.contains(main_program))
        || BOOTSTRAP_FRAGMENTS.iter().any(|f| file.contains(f))
}

/// True when `file` is a plain relative path that cannot leave its base.
fn is_contained(file: &str) -> bool {
    Utf8Path::new(file)
        .components()
        .all(|c| matches!(c, Utf8Component::Normal(_)))
}

/// Relocates `deps_files` (relative to `app_dir`) into `app_dir/subdir`,
/// keeping their relative layout.
///
/// Pinned files count as moved without touching the disk. Missing files
/// are skipped silently, as are entries with absolute or `..` components.
/// Source directories emptied by a move are removed up to `app_dir`.
/// A failed move is logged and counted in `failed`.
pub fn relocate(
    deps_files: &[String],
    main_program: &str,
    app_dir: &Utf8Path,
    subdir: &str,
) -> RelocationReport {
    let mut report = RelocationReport {
        total: deps_files.len(),
        ..Default::default()
    };
    let dest_root = app_dir.join(subdir);

    for file in deps_files {
        if is_pinned(file, main_program) {
            debug!(file = %file, "pinned beside the entry point");
            report.moved += 1;
            continue;
        }

        if !is_contained(file) {
            debug!(file = %file, "path escapes the app directory, skipping");
            continue;
        }

        let source = app_dir.join(file);
        if !path_exists(&source) {
            debug!(file = %file, "not present, skipping");
            continue;
        }
        let dest = dest_root.join(file);
        let (Some(source_dir), Some(dest_dir)) = (source.parent(), dest.parent()) else {
            continue;
        };

        if !ensure_dir_exists(dest_dir) {
            error!(path = %dest_dir, "directory is not writeable");
        }
        match fs::rename(&source, &dest) {
            Ok(()) => report.moved += 1,
            Err(e) => {
                error!(file = %file, error = %e, "move failed");
                report.failed += 1;
            }
        }

        move_sidecars(&source, source_dir, dest_dir);

        prune_empty_dirs(source_dir, app_dir);
    }

    info!(
        moved = report.moved,
        total = report.total,
        "{} of {} runtime files moved",
        report.moved,
        report.total
    );
    report
}

/// Removes `dir` and each ancestor that is left empty, stopping before `app_dir`.
fn prune_empty_dirs(dir: &Utf8Path, app_dir: &Utf8Path) {
    let mut current = Some(dir);
    while let Some(dir) = current
        && dir != app_dir
        && dir.starts_with(app_dir)
        && remove_if_empty(dir)
    {
        debug!(path = %dir, "removed empty directory");
        current = dir.parent();
    }
}

fn move_sidecars(source: &Utf8Path, source_dir: &Utf8Path, dest_dir: &Utf8Path) {
    let Some(stem) = source.file_stem() else {
        return;
    };
    for ext in SIDECAR_EXTENSIONS {
        let name = format!("{stem}.{ext}");
        let from = source_dir.join(&name);
        if path_exists(&from)
            && let Err(e) = fs::rename(&from, dest_dir.join(&name))
        {
            debug!(path = %from, error = %e, "sidecar not moved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        (temp, root)
    }

    fn touch(path: &Utf8Path) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, b"x").expect("write");
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn moves_plain_dependencies() {
        let (_t, app) = temp_root();
        touch(&app.join("A.dll"));
        touch(&app.join("B.dll"));

        let report = relocate(&files(&["A.dll", "B.dll"]), "App", &app, "runtimes");

        assert_eq!(
            report,
            RelocationReport {
                moved: 2,
                total: 2,
                failed: 0
            }
        );
        assert!(app.join("runtimes/A.dll").is_file());
        assert!(app.join("runtimes/B.dll").is_file());
        assert!(!app.join("A.dll").exists());
    }

    #[test]
    fn bootstrap_and_main_program_stay_put() {
        let (_t, app) = temp_root();
        touch(&app.join("App.dll"));
        touch(&app.join("hostfxr.dll"));

        let report = relocate(&files(&["App.dll", "hostfxr.dll"]), "App", &app, "runtimes");

        assert_eq!(report.moved, 2);
        assert_eq!(report.total, 2);
        assert!(app.join("App.dll").is_file());
        assert!(app.join("hostfxr.dll").is_file());
        assert!(!app.join("runtimes").exists());
    }

    #[test]
    fn pinned_fragments() {
        assert!(is_pinned("libhostpolicy.so", "App"));
        assert!(is_pinned("apphost.exe", "App"));
        assert!(is_pinned("libhostfxr.dylib", "App"));
        assert!(is_pinned("App.Views.dll", "App"));
        assert!(!is_pinned("System.Runtime.dll", "App"));
        assert!(!is_pinned("System.Runtime.dll", ""));
    }

    #[test]
    fn keeps_relative_layout_and_prunes_empty_dirs() {
        let (_t, app) = temp_root();
        touch(&app.join("lib/netstandard2.0/Newtonsoft.Json.dll"));
        touch(&app.join("lib/netstandard2.0/Newtonsoft.Json.xml"));
        touch(&app.join("lib/netstandard2.0/Newtonsoft.Json.pdb"));

        let report = relocate(
            &files(&["lib/netstandard2.0/Newtonsoft.Json.dll"]),
            "App",
            &app,
            "runtimes",
        );

        assert_eq!(report.moved, 1);
        let dest = app.join("runtimes/lib/netstandard2.0");
        assert!(dest.join("Newtonsoft.Json.dll").is_file());
        assert!(dest.join("Newtonsoft.Json.xml").is_file());
        assert!(dest.join("Newtonsoft.Json.pdb").is_file());
        assert!(!app.join("lib/netstandard2.0").exists());
    }

    #[test]
    fn missing_files_are_not_counted() {
        let (_t, app) = temp_root();
        touch(&app.join("A.dll"));

        let report = relocate(&files(&["A.dll", "Gone.dll"]), "App", &app, "runtimes");

        assert_eq!(
            report,
            RelocationReport {
                moved: 1,
                total: 2,
                failed: 0
            }
        );
    }

    #[test]
    fn app_dir_itself_is_never_removed() {
        let (_t, root) = temp_root();
        let app = root.join("publish");
        touch(&app.join("A.dll"));

        relocate(&files(&["A.dll"]), "App", &app, "runtimes");

        assert!(app.is_dir());
    }

    #[test]
    fn prunes_every_emptied_ancestor() {
        let (_t, app) = temp_root();
        touch(&app.join("lib/netstandard2.0/Pkg.dll"));

        let report = relocate(&files(&["lib/netstandard2.0/Pkg.dll"]), "App", &app, "runtimes");

        assert_eq!(report.moved, 1);
        assert!(app.join("runtimes/lib/netstandard2.0/Pkg.dll").is_file());
        assert!(!app.join("lib").exists());
        assert!(app.is_dir());
    }

    #[test]
    fn pruning_stops_at_a_non_empty_ancestor() {
        let (_t, app) = temp_root();
        touch(&app.join("lib/netstandard2.0/Pkg.dll"));
        touch(&app.join("lib/readme.txt"));

        relocate(&files(&["lib/netstandard2.0/Pkg.dll"]), "App", &app, "runtimes");

        assert!(!app.join("lib/netstandard2.0").exists());
        assert!(app.join("lib/readme.txt").is_file());
    }

    #[test]
    fn escaping_paths_are_left_alone() {
        let (_t, root) = temp_root();
        let app = root.join("publish");
        touch(&app.join("A.dll"));
        touch(&root.join("outside.dll"));
        let absolute = root.join("outside.dll").to_string();

        let report = relocate(
            &files(&["../outside.dll", &absolute, "lib/../A.dll"]),
            "App",
            &app,
            "runtimes",
        );

        assert_eq!(report.moved, 0);
        assert_eq!(report.failed, 0);
        assert!(root.join("outside.dll").is_file());
        assert!(app.join("A.dll").is_file());
        assert!(!app.join("runtimes").exists());
    }
}
