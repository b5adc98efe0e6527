//! A loaded project descriptor plus the lookups the patch steps need.
//! Everything walks the flat object table; nothing here creates structure
//! an accessor did not find.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ctx::{DynResult, StrError};
use crate::pbx::{self, Dict, Str, Value};

#[derive(Debug)]
pub struct Pbxproj {
  pub path: PathBuf,
  pub root: Dict
}

impl Pbxproj {
  /// Parses the descriptor at `path` and checks the envelope every later
  /// accessor relies on: an objects dictionary and a rootObject id.
  pub fn load(path: &Path) -> DynResult<Self> {
    let text = fs::read_to_string(path)
      .map_err(|e| StrError(format!("cannot read {}: {}", path.display(), e)))?;
    let root = pbx::parse(&text)
      .map_err(|e| StrError(format!("{}: {}", path.display(), e)))?;

    let project = Pbxproj { path: path.to_path_buf(), root };
    if project.root.get_dict("objects").is_none() {
      return Err(StrError(format!("{}: no objects dictionary", project.path.display())).into());
    }
    if project.root.get_str("rootObject").is_none() {
      return Err(StrError(format!("{}: no rootObject", project.path.display())).into());
    }
    Ok(project)
  }

  pub fn save(&self) -> DynResult<()> {
    fs::write(&self.path, pbx::to_text(&self.root))
      .map_err(|e| StrError(format!("cannot write {}: {}", self.path.display(), e)))?;
    Ok(())
  }

  pub fn objects(&self) -> &Dict {
    self.root.get_dict("objects").expect("objects dictionary is checked at load")
  }

  pub fn objects_mut(&mut self) -> &mut Dict {
    self.root.get_dict_mut("objects").expect("objects dictionary is checked at load")
  }

  pub fn object(&self, id: &str) -> Option<&Dict> {
    self.objects().get_dict(id)
  }

  pub fn object_mut(&mut self, id: &str) -> Option<&mut Dict> {
    self.objects_mut().get_dict_mut(id)
  }

  /// Identifier of the native target called `name`.
  pub fn target_id(&self, name: &str) -> Option<&str> {
    self.objects().iter().find_map(|e| {
      let object = e.value.as_dict()?;
      let hit = object.get_str("isa") == Some("PBXNativeTarget")
        && object.get_str("name") == Some(name);
      match hit {
        true  => Some(e.key.text.as_str()),
        false => None
      }
    })
  }

  pub fn target_names(&self) -> Vec<&str> {
    self.objects().iter()
      .filter_map(|e| {
        let object = e.value.as_dict()?;
        match object.get_str("isa") == Some("PBXNativeTarget") {
          true  => object.get_str("name"),
          false => None
        }
      })
      .collect()
  }

  /// Build configuration ids of target `name`, in configuration list order.
  pub fn target_config_ids(&self, name: &str) -> Vec<String> {
    let list = self.target_id(name)
      .and_then(|id| self.object(id))
      .and_then(|target| target.get_str("buildConfigurationList"))
      .and_then(|id| self.object(id));
    let configs = list.and_then(|list| list.get_array("buildConfigurations"));
    match configs {
      None         => Vec::new(),
      Some(values) => values.iter().filter_map(Value::as_str).map(str::to_string).collect()
    }
  }

  pub fn config_name(&self, config_id: &str) -> Option<&str> {
    self.object(config_id)?.get_str("name")
  }

  /// Mutable build settings of one configuration. None when the object is
  /// missing or carries no buildSettings dictionary; a missing dictionary
  /// is never created here.
  pub fn settings_mut(&mut self, config_id: &str) -> Option<&mut Dict> {
    self.object_mut(config_id)?.get_dict_mut("buildSettings")
  }

  pub fn main_group_id(&self) -> Option<&str> {
    let project_id = self.root.get_str("rootObject")?;
    self.object(project_id)?.get_str("mainGroup")
  }

  /// True when some PBXFileReference already points at `path`, by path or
  /// by display name.
  pub fn has_file_ref(&self, path: &str) -> bool {
    self.objects().iter().any(|e| {
      let object = match e.value.as_dict() {
        Some(d) => d,
        None    => return false
      };
      object.get_str("isa") == Some("PBXFileReference")
        && (object.get_str("path") == Some(path) || object.get_str("name") == Some(path))
    })
  }

  /// Registers a file reference and lists it under `group_id`. Returns the
  /// fresh identifier.
  pub fn add_file_ref(&mut self, path: &str, file_type: &str, group_id: &str) -> DynResult<String> {
    let id   = pbx::new_id();
    let name = file_name(path).to_string();

    let mut file_ref = Dict::new();
    file_ref.push(Str::plain("isa"), Value::string("PBXFileReference"));
    file_ref.push(Str::plain("lastKnownFileType"), Value::string(file_type));
    if name != path {
      file_ref.push(Str::plain("name"), Value::string(&name[..]));
    }
    file_ref.push(Str::plain("path"), Value::string(path));
    file_ref.push(Str::plain("sourceTree"), Value::string("<group>"));

    let children = self.object_mut(group_id)
      .and_then(|group| group.get_array_mut("children"))
      .ok_or_else(|| StrError(format!("group {} has no children array", group_id)))?;
    children.push(Value::annotated(&id[..], &name[..]));

    self.objects_mut().push(Str::annotated(&id[..], &name[..]), Value::Dict(file_ref));
    Ok(id)
  }

  /// Appends an annotated object to the table; the writer files it into its
  /// isa section on the next save.
  pub fn append_object(&mut self, id: String, comment: &str, object: Dict) {
    self.objects_mut().push(Str::annotated(id, comment), Value::Dict(object));
  }

  /// True when any build configuration already produces `product_name`.
  /// Structural on purpose: a bundle id or a comment containing the same
  /// word cannot fake a hit.
  pub fn has_config_producing(&self, product_name: &str) -> bool {
    self.objects().iter().any(|e| {
      let object = match e.value.as_dict() {
        Some(d) => d,
        None    => return false
      };
      object.get_str("isa") == Some("XCBuildConfiguration")
        && object.get_dict("buildSettings").and_then(|s| s.get_str("PRODUCT_NAME")) == Some(product_name)
    })
  }

  pub fn count_objects(&self, isa: &str) -> usize {
    self.objects().iter()
      .filter(|e| e.value.as_dict().and_then(|d| d.get_str("isa")) == Some(isa))
      .count()
  }
}

fn file_name(path: &str) -> &str {
  path.rsplit('/').next().unwrap_or(path)
}
