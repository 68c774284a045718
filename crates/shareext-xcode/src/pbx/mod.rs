//! `project.pbxproj` backed project descriptor
//!
//! The project file is read and written through the `plist` crate; this
//! module only edits the resulting object table. Objects are plain
//! dictionaries keyed by 24 hex digit ids, each carrying an `isa` class name.

mod objects;

use crate::descriptor::{
    BuildConfiguration, BuildPhase, BuildSettings, ObjectId, ProjectDescriptor, TargetKind,
};
use crate::error::{Error, Result};
use camino::Utf8Path;
use objects::{id_array, id_value, string};
use plist::{Dictionary, Value};
use tracing::debug;
use uuid::Uuid;

const OBJECTS_KEY: &str = "objects";
const ROOT_OBJECT_KEY: &str = "rootObject";

/// In-memory Xcode project
#[derive(Debug, Clone, PartialEq)]
pub struct PbxProject {
    /// Top-level keys other than `objects` (archiveVersion, objectVersion, ...)
    header: Dictionary,

    /// Object table
    objects: Dictionary,

    /// The `PBXProject` object id
    root_object: ObjectId,
}

impl PbxProject {
    /// Read a project file (ASCII, XML or binary plist)
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let value = Value::from_file(path).map_err(|e| Error::project_file(path.as_str(), e))?;
        let project = Self::from_value(value)?;
        debug!("Opened {} with {} objects", path, project.objects.len());
        Ok(project)
    }

    /// Build from an already parsed property list
    pub fn from_value(value: Value) -> Result<Self> {
        let mut header = value
            .into_dictionary()
            .ok_or_else(|| Error::malformed("project root is not a dictionary"))?;

        let objects = header
            .remove(OBJECTS_KEY)
            .and_then(Value::into_dictionary)
            .ok_or_else(|| Error::malformed("missing objects table"))?;

        let root_object = header
            .get(ROOT_OBJECT_KEY)
            .and_then(Value::as_string)
            .map(ObjectId::from)
            .ok_or_else(|| Error::malformed("missing rootObject"))?;

        let project = Self {
            header,
            objects,
            root_object,
        };

        if project.isa(&project.root_object) != Some("PBXProject") {
            return Err(Error::malformed(format!(
                "rootObject {} is not a PBXProject",
                project.root_object
            )));
        }

        Ok(project)
    }

    /// Minimal project with a single application target
    pub fn scaffold(app_name: &str) -> Result<Self> {
        let mut project = Self {
            header: Dictionary::new(),
            objects: Dictionary::new(),
            root_object: ObjectId::new(""),
        };

        let debug = project.insert_object(objects::build_configuration("Debug", Dictionary::new()));
        let release =
            project.insert_object(objects::build_configuration("Release", Dictionary::new()));
        let list = project.insert_object(objects::configuration_list(&[debug, release], "Release"));

        let products = project.insert_object(objects::group(Some("Products"), None, &[]));
        let sources = project.insert_object(objects::group(Some(app_name), Some(app_name), &[]));
        let main = project.insert_object(objects::group(None, None, &[sources, products.clone()]));

        let root = project.insert_object(objects::project(&list, &main, &products));
        project.header.insert("archiveVersion".into(), string("1"));
        project
            .header
            .insert("classes".into(), Value::Dictionary(Dictionary::new()));
        project.header.insert("objectVersion".into(), string("54"));
        project.header.insert(ROOT_OBJECT_KEY.into(), id_value(&root));
        project.root_object = root;

        let host = project.add_target(app_name, TargetKind::Application, app_name)?;
        project.add_build_phase(&host, &BuildPhase::Sources, "Sources", &[])?;
        project.add_build_phase(&host, &BuildPhase::Resources, "Resources", &[])?;

        Ok(project)
    }

    /// Write the project as an XML property list
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        plist::to_file_xml(path, &self.to_document())
            .map_err(|e| Error::project_file(path.as_str(), e))?;
        debug!("Saved project to {}", path);
        Ok(())
    }

    /// Full document, objects table included
    pub fn to_document(&self) -> Dictionary {
        let mut document = self.header.clone();
        document.insert(OBJECTS_KEY.into(), Value::Dictionary(self.objects.clone()));
        document
    }

    /// Look up an object by id
    pub fn object(&self, id: &ObjectId) -> Option<&Dictionary> {
        self.objects.get(id.as_str()).and_then(Value::as_dictionary)
    }

    fn object_mut(&mut self, id: &ObjectId) -> Result<&mut Dictionary> {
        self.objects
            .get_mut(id.as_str())
            .and_then(Value::as_dictionary_mut)
            .ok_or_else(|| Error::object_not_found(id.as_str()))
    }

    /// `isa` of an object
    pub fn isa(&self, id: &ObjectId) -> Option<&str> {
        self.string_field(id, "isa")
    }

    fn string_field(&self, id: &ObjectId, key: &str) -> Option<&str> {
        self.object(id)
            .and_then(|o| o.get(key))
            .and_then(Value::as_string)
    }

    fn id_list(&self, id: &ObjectId, key: &str) -> Vec<ObjectId> {
        self.object(id)
            .and_then(|o| o.get(key))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_string)
                    .map(ObjectId::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every object of one class
    pub fn objects_of_isa<'a>(
        &'a self,
        isa: &'a str,
    ) -> impl Iterator<Item = (ObjectId, &'a Dictionary)> + 'a {
        self.objects.iter().filter_map(move |(id, value)| {
            let dict = value.as_dictionary()?;
            (dict.get("isa").and_then(Value::as_string) == Some(isa))
                .then(|| (ObjectId::from(id.as_str()), dict))
        })
    }

    fn generate_id(&self) -> ObjectId {
        loop {
            let mut id = Uuid::new_v4().simple().to_string().to_uppercase();
            id.truncate(24);
            if !self.objects.contains_key(&id) {
                return ObjectId::new(id);
            }
        }
    }

    fn insert_object(&mut self, object: Dictionary) -> ObjectId {
        let id = self.generate_id();
        self.objects
            .insert(id.as_str().to_string(), Value::Dictionary(object));
        id
    }

    fn push_id(&mut self, owner: &ObjectId, key: &str, id: &ObjectId) -> Result<()> {
        let object = self.object_mut(owner)?;
        match object.get_mut(key) {
            Some(Value::Array(items)) => items.push(id_value(id)),
            Some(_) => {
                return Err(Error::malformed(format!(
                    "{}.{} is not an array",
                    owner, key
                )))
            }
            None => {
                object.insert(key.to_string(), id_array(std::slice::from_ref(id)));
            }
        }
        Ok(())
    }

    /// Targets in project order
    pub fn targets(&self) -> Vec<ObjectId> {
        self.id_list(&self.root_object, "targets")
    }

    pub fn target_name(&self, target: &ObjectId) -> Option<&str> {
        self.string_field(target, "name")
    }

    /// Build phases of a target in execution order
    pub fn build_phases(&self, target: &ObjectId) -> Vec<ObjectId> {
        self.id_list(target, "buildPhases")
    }

    /// Paths of the files referenced by a build phase
    pub fn build_phase_files(&self, phase: &ObjectId) -> Vec<String> {
        self.id_list(phase, "files")
            .iter()
            .filter_map(|build_file| self.string_field(build_file, "fileRef"))
            .map(ObjectId::from)
            .filter_map(|file_ref| self.string_field(&file_ref, "path").map(str::to_owned))
            .collect()
    }

    /// Children of a group
    pub fn group_children(&self, group: &ObjectId) -> Vec<ObjectId> {
        self.id_list(group, "children")
    }

    pub fn main_group(&self) -> Result<ObjectId> {
        self.string_field(&self.root_object, "mainGroup")
            .map(ObjectId::from)
            .ok_or_else(|| Error::malformed("PBXProject has no mainGroup"))
    }

    fn products_group(&self) -> Option<ObjectId> {
        self.string_field(&self.root_object, "productRefGroup")
            .map(ObjectId::from)
    }

    /// Target dependencies of a target, resolved to the depended-on targets
    pub fn target_dependencies(&self, target: &ObjectId) -> Vec<ObjectId> {
        self.id_list(target, "dependencies")
            .iter()
            .filter_map(|dependency| self.string_field(dependency, "target"))
            .map(ObjectId::from)
            .collect()
    }

    /// Build settings of one of a target's configurations
    pub fn target_build_settings(
        &self,
        target: &ObjectId,
        configuration: &str,
    ) -> Option<&Dictionary> {
        let list = ObjectId::from(self.string_field(target, "buildConfigurationList")?);
        self.id_list(&list, "buildConfigurations")
            .into_iter()
            .find(|id| self.string_field(id, "name") == Some(configuration))
            .and_then(|id| self.object(&id))
            .and_then(|config| config.get("buildSettings"))
            .and_then(Value::as_dictionary)
    }

    /// Add the extension product to the host's "Embed App Extensions" phase
    /// and make the host depend on the extension target
    fn embed_extension(
        &mut self,
        host: &ObjectId,
        target: &ObjectId,
        product: &ObjectId,
        name: &str,
    ) -> Result<()> {
        let existing = self.build_phases(host).into_iter().find(|phase| {
            self.isa(phase) == Some("PBXCopyFilesBuildPhase")
                && self.string_field(phase, "dstSubfolderSpec")
                    == Some(objects::PLUGINS_SUBFOLDER_SPEC)
        });
        let phase = match existing {
            Some(phase) => phase,
            None => {
                let phase = self.insert_object(objects::embed_extensions_phase());
                self.push_id(host, "buildPhases", &phase)?;
                phase
            }
        };

        let build_file = self.insert_object(objects::build_file(
            product,
            Some(objects::remove_headers_on_copy()),
        ));
        self.push_id(&phase, "files", &build_file)?;

        let root = self.root_object.clone();
        let proxy = self.insert_object(objects::container_item_proxy(&root, target, name));
        let dependency = self.insert_object(objects::target_dependency(target, &proxy));
        self.push_id(host, "dependencies", &dependency)?;

        debug!("Embedded {} into host target {}", name, host);
        Ok(())
    }
}

impl ProjectDescriptor for PbxProject {
    fn find_target(&self, name: &str) -> Option<ObjectId> {
        self.objects_of_isa("PBXNativeTarget")
            .find(|(_, target)| target.get("name").and_then(Value::as_string) == Some(name))
            .map(|(id, _)| id)
    }

    fn add_target(&mut self, name: &str, kind: TargetKind, subfolder: &str) -> Result<ObjectId> {
        if self.find_target(name).is_some() {
            return Err(Error::duplicate_target(name));
        }
        let host = self.targets().into_iter().next();

        let debug = self.insert_object(objects::build_configuration(
            "Debug",
            objects::target_build_settings(name, kind, subfolder, true),
        ));
        let release = self.insert_object(objects::build_configuration(
            "Release",
            objects::target_build_settings(name, kind, subfolder, false),
        ));
        let list = self.insert_object(objects::configuration_list(&[debug, release], "Release"));

        let product = self.insert_object(objects::product_reference(name, kind));
        if let Some(products) = self.products_group() {
            self.push_id(&products, "children", &product)?;
        }

        let target = self.insert_object(objects::native_target(name, kind, &list, &product));
        let root = self.root_object.clone();
        self.push_id(&root, "targets", &target)?;

        if kind == TargetKind::AppExtension {
            if let Some(host) = host {
                self.embed_extension(&host, &target, &product, name)?;
            }
        }

        debug!("Added {} target {} ({})", kind.product_type(), name, target);
        Ok(target)
    }

    fn add_build_phase(
        &mut self,
        target: &ObjectId,
        phase: &BuildPhase,
        name: &str,
        files: &[&str],
    ) -> Result<ObjectId> {
        if self.isa(target) != Some("PBXNativeTarget") {
            return Err(Error::target_not_found(target.as_str()));
        }

        let build_files: Vec<ObjectId> = files
            .iter()
            .map(|path| {
                let file_ref = self.insert_object(objects::file_reference(path));
                self.insert_object(objects::build_file(&file_ref, None))
            })
            .collect();

        let phase_id = self.insert_object(objects::build_phase(phase, name, &build_files));
        self.push_id(target, "buildPhases", &phase_id)?;

        debug!("Added {} '{}' to {}", phase.isa(), name, target);
        Ok(phase_id)
    }

    fn find_group(&self, name: &str) -> Option<ObjectId> {
        self.objects_of_isa("PBXGroup")
            .find(|(_, group)| {
                let label = group
                    .get("name")
                    .or_else(|| group.get("path"))
                    .and_then(Value::as_string);
                label == Some(name)
            })
            .map(|(id, _)| id)
    }

    fn create_group(&mut self, name: &str, path: &str) -> Result<ObjectId> {
        let main = self.main_group()?;
        let group = self.insert_object(objects::group(Some(name), Some(path), &[]));
        self.push_id(&main, "children", &group)?;
        Ok(group)
    }

    fn add_file(&mut self, path: &str, group: &ObjectId) -> Result<Option<ObjectId>> {
        if self.isa(group) != Some("PBXGroup") {
            return Err(Error::object_not_found(group.as_str()));
        }

        let already_present = self
            .group_children(group)
            .iter()
            .any(|child| self.string_field(child, "path") == Some(path));
        if already_present {
            debug!("{} already in group {}", path, group);
            return Ok(None);
        }

        let file_ref = self.insert_object(objects::file_reference(path));
        self.push_id(group, "children", &file_ref)?;
        Ok(Some(file_ref))
    }

    fn build_configurations_mut(
        &mut self,
    ) -> Box<dyn Iterator<Item = BuildConfiguration<'_>> + '_> {
        Box::new(self.objects.iter_mut().filter_map(|(id, value)| {
            let object = value.as_dictionary_mut()?;
            if object.get("isa").and_then(Value::as_string) != Some("XCBuildConfiguration") {
                return None;
            }
            let name = object
                .get("name")
                .and_then(Value::as_string)
                .map(str::to_owned);
            let settings = object.get_mut("buildSettings")?.as_dictionary_mut()?;
            Some(BuildConfiguration {
                id: id.as_str(),
                name,
                settings: BuildSettings::new(settings),
            })
        }))
    }
}
