//! Sequential generation pipeline
//!
//! Each [`ConfigMod`] receives the exported configuration by value and the
//! project descriptor by exclusive borrow, and hands the configuration back
//! for the next step. Steps never run concurrently and are never re-entered.

use crate::error::{Error, Result};
use crate::{
    AppEntitlements, ExtensionConfig, ShareExtensionEntitlements, ShareExtensionInfoPlist,
    ShareExtensionTarget,
};
use shareext_core::{ExportedConfig, ExtensionIdentity};
use shareext_xcode::ProjectDescriptor;
use tracing::{debug, info};

/// One generation step
pub trait ConfigMod {
    /// Step name used in logs and errors
    fn name(&self) -> &'static str;

    /// Apply the step and return the (possibly updated) configuration
    fn apply(
        &self,
        config: ExportedConfig,
        project: &mut dyn ProjectDescriptor,
    ) -> Result<ExportedConfig>;
}

/// Ordered chain of generation steps
#[derive(Default)]
pub struct ModPipeline {
    mods: Vec<Box<dyn ConfigMod>>,
}

impl ModPipeline {
    /// Empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// The share extension pipeline in its required order
    pub fn share_extension() -> Self {
        Self::new()
            .with(ExtensionConfig)
            .with(ShareExtensionEntitlements)
            .with(ShareExtensionTarget)
            .with(ShareExtensionInfoPlist)
            .with(AppEntitlements)
    }

    /// Append a step
    pub fn with(mut self, step: impl ConfigMod + 'static) -> Self {
        self.mods.push(Box::new(step));
        self
    }

    /// Names of the steps in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.mods.iter().map(|m| m.name()).collect()
    }

    /// Run every step in order, stopping at the first failure
    ///
    /// The identity is derived once up front so a missing bundle identifier
    /// fails before any file or project mutation. Nothing is rolled back on
    /// failure.
    pub fn run(
        &self,
        config: ExportedConfig,
        project: &mut dyn ProjectDescriptor,
    ) -> Result<ExportedConfig> {
        let identity = ExtensionIdentity::derive(&config)?;
        info!(
            "Generating share extension {} ({})",
            identity.name, identity.bundle_identifier
        );

        let mut config = config;
        for step in &self.mods {
            debug!("Running {}", step.name());
            config = step
                .apply(config, project)
                .map_err(|e| Error::in_step(step.name(), e))?;
        }

        info!("Share extension {} ready", identity.name);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shareext_core::{AppConfig, ModRequest};
    use shareext_xcode::PbxProject;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ConfigMod for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn apply(
            &self,
            mut config: ExportedConfig,
            _project: &mut dyn ProjectDescriptor,
        ) -> Result<ExportedConfig> {
            self.log.borrow_mut().push(self.name);
            config
                .config
                .extra
                .insert(self.name.to_string(), serde_json::Value::Bool(true));
            Ok(config)
        }
    }

    struct Failing;

    impl ConfigMod for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(
            &self,
            _config: ExportedConfig,
            _project: &mut dyn ProjectDescriptor,
        ) -> Result<ExportedConfig> {
            Err(Error::filesystem(
                "/missing",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        }
    }

    fn config(bundle_id: Option<&str>) -> ExportedConfig {
        let mut app = AppConfig::new("MyApp");
        if let Some(id) = bundle_id {
            app = app.with_bundle_identifier(id);
        }
        ExportedConfig::new(app, ModRequest::new("/work/ios", "MyApp"))
    }

    #[test]
    fn test_share_extension_order() {
        assert_eq!(
            ModPipeline::share_extension().step_names(),
            vec![
                "extension-config",
                "share-extension-entitlements",
                "share-extension-target",
                "share-extension-info-plist",
                "app-entitlements",
            ]
        );
    }

    #[test]
    fn test_steps_thread_config_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pipeline = ModPipeline::new()
            .with(Recorder { name: "first", log: log.clone() })
            .with(Recorder { name: "second", log: log.clone() });
        let mut project = PbxProject::scaffold("MyApp").unwrap();

        let out = pipeline.run(config(Some("com.acme.myapp")), &mut project).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert!(out.config.extra.contains_key("first"));
        assert!(out.config.extra.contains_key("second"));
    }

    #[test]
    fn test_missing_bundle_identifier_runs_no_step() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pipeline = ModPipeline::new().with(Recorder { name: "first", log: log.clone() });
        let mut project = PbxProject::scaffold("MyApp").unwrap();

        let err = pipeline.run(config(None), &mut project).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failure_stops_chain_and_names_step() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pipeline = ModPipeline::new()
            .with(Failing)
            .with(Recorder { name: "after", log: log.clone() });
        let mut project = PbxProject::scaffold("MyApp").unwrap();

        let err = pipeline.run(config(Some("com.acme.myapp")), &mut project).unwrap_err();
        assert!(err.to_string().starts_with("failing failed"));
        assert!(matches!(err.root(), Error::Filesystem { .. }));
        assert!(log.borrow().is_empty());
    }
}
