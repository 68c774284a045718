//! Identity command

use crate::cli::IdentityArgs;
use crate::commands::load_project;
use crate::output;
use anyhow::Result;
use shareext_core::{ExportedConfig, ExtensionIdentity};

pub fn run(args: IdentityArgs) -> Result<()> {
    let (file, request) = load_project(&args.project)?;
    let identity = ExtensionIdentity::derive(&ExportedConfig::new(file.config, request))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&identity)?);
        return Ok(());
    }

    output::header("Share extension");
    output::kv("Target", &identity.name);
    output::kv("Bundle identifier", &identity.bundle_identifier);
    output::kv("App group", &identity.app_group_id);
    output::kv("Directory", identity.target_path.as_str());
    output::kv("Entitlements", identity.entitlements_file_path.as_str());
    output::kv("Info.plist", identity.info_plist_file_path.as_str());

    Ok(())
}
