//! Apply command

use crate::cli::ApplyArgs;
use crate::commands::load_project;
use crate::output;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use shareext_core::{AppConfigFile, ExportedConfig, ExtensionIdentity, ModRequest};
use shareext_mods::ModPipeline;
use shareext_xcode::{PbxProject, ProjectDescriptor};
use std::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Top-level directories of the platform root left out of a dry-run copy
const SCRATCH_EXCLUDES: &[&str] = &["Pods", "build"];

pub fn run(args: ApplyArgs) -> Result<()> {
    let (file, request) = load_project(&args.project)?;

    if args.dry_run {
        dry_run(file, request)
    } else {
        apply(file, request)
    }
}

/// Generate in place and persist the project and app configuration
fn apply(mut file: AppConfigFile, request: ModRequest) -> Result<()> {
    let pbxproj = request.pbxproj_path();
    let mut project = PbxProject::open(&pbxproj)
        .with_context(|| format!("Failed to open {}", pbxproj))?;

    let exported = ExportedConfig::new(file.config.clone(), request);
    let identity = ExtensionIdentity::derive(&exported)?;
    if project.find_target(&identity.name).is_some() {
        output::warning(&format!(
            "Target {} already exists; refreshing its files and build settings",
            identity.name
        ));
    }
    let exported = ModPipeline::share_extension()
        .run(exported, &mut project)
        .context("Share extension generation failed")?;

    project
        .save(&pbxproj)
        .with_context(|| format!("Failed to save {}", pbxproj))?;

    file.config = exported.config;
    if file.is_modified()? {
        file.save()
            .with_context(|| format!("Failed to save {}", file.config_path))?;
        output::info(&format!("Updated {}", file.config_path));
    }

    output::success(&format!(
        "Share extension {} ({}) added to {}",
        identity.name, identity.bundle_identifier, pbxproj
    ));
    Ok(())
}

/// Generate against a scratch copy and report what would change
fn dry_run(mut file: AppConfigFile, request: ModRequest) -> Result<()> {
    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let scratch_root = Utf8PathBuf::try_from(scratch.path().join("ios"))
        .context("Scratch directory path is not valid UTF-8")?;
    copy_platform_root(&request.platform_project_root, &scratch_root)?;

    let scratch_request = request.rebased(&scratch_root);
    let pbxproj = scratch_request.pbxproj_path();
    let mut project = PbxProject::open(&pbxproj)
        .with_context(|| format!("Failed to open {}", request.pbxproj_path()))?;

    let exported = ExportedConfig::new(file.config.clone(), scratch_request);
    let identity = ExtensionIdentity::derive(&exported)?;
    let targets_before = project.targets().len();
    let exported = ModPipeline::share_extension()
        .run(exported, &mut project)
        .context("Share extension generation failed")?;

    output::header("Dry run");
    output::kv("Target", &identity.name);
    output::kv("Bundle identifier", &identity.bundle_identifier);
    output::kv("App group", &identity.app_group_id);
    output::kv(
        "New targets",
        &(project.targets().len() - targets_before).to_string(),
    );

    output::header("Files that would be written");
    for path in written_files(&exported.request, &identity)? {
        if let Ok(relative) = path.strip_prefix(&scratch_root) {
            println!("  {}", request.platform_project_root.join(relative));
        }
    }

    file.config = exported.config;
    if file.is_modified()? {
        output::info(&format!("{} would be updated", file.config_path));
    }
    output::success("Dry run complete, nothing was changed");
    Ok(())
}

/// Files the pipeline writes for `request`
fn written_files(request: &ModRequest, identity: &ExtensionIdentity) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(&identity.target_path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", identity.target_path))?;
        if entry.file_type().is_file() {
            if let Some(path) = Utf8Path::from_path(entry.path()) {
                files.push(path.to_owned());
            }
        }
    }
    files.push(request.host_entitlements_path());
    files.push(request.pbxproj_path());
    Ok(files)
}

/// Copy the platform root into `target`, skipping installed pods and build output
fn copy_platform_root(source: &Utf8Path, target: &Utf8Path) -> Result<()> {
    let walker = WalkDir::new(source).into_iter().filter_entry(|entry| {
        entry.depth() != 1
            || !entry
                .file_name()
                .to_str()
                .is_some_and(|name| SCRATCH_EXCLUDES.contains(&name))
    });

    let mut copied = 0usize;
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read {}", source))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("{} is outside {}", entry.path().display(), source))?;
        let destination = target.as_std_path().join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)
                .with_context(|| format!("Failed to create {}", destination.display()))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &destination)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }

    debug!("Copied {} files from {} to {}", copied, source, target);
    Ok(())
}
