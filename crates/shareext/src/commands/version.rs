//! Version command

use crate::cli::VersionArgs;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.display());

        if let Some(commit) = &info.commit {
            println!("Commit:     {}", commit);
        }
        if let Some(date) = &info.build_date {
            println!("Build date: {}", date);
        }
        if let Some(target) = &info.target {
            println!("Target:     {}", target);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_all_fields() {
        let info = VersionInfo {
            version: "1.2.3".to_string(),
            commit: Some("abc1234".to_string()),
            build_date: Some("2026-01-01".to_string()),
            target: Some("aarch64-apple-darwin".to_string()),
        };
        assert_eq!(info.display(), "shareext 1.2.3 (abc1234) aarch64-apple-darwin");
    }

    #[test]
    fn test_display_without_optional_fields() {
        let info = VersionInfo {
            version: "0.1.0".to_string(),
            commit: None,
            build_date: None,
            target: None,
        };
        assert_eq!(info.to_string(), "shareext 0.1.0");
    }

    #[test]
    fn test_current_serializes() {
        let info = VersionInfo::current();
        let json = serde_json::to_string(&info).unwrap();
        let back: VersionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, env!("CARGO_PKG_VERSION"));
    }
}
