//! Build configurations for the file-provider extension. Only the
//! XCBuildConfiguration objects are scaffolded; the target itself, its
//! phases and its product stay owned by the Xcode side of the tree.

use crate::ctx::{Config, Env};
use crate::pbx::{self, Dict, Pbxproj, Str, Value};

/// The extension loads from inside the app bundle, two levels above its
/// own Frameworks folder.
const RUNPATHS: &str = "$(inherited) @executable_path/Frameworks @executable_path/../../Frameworks";

/// Appends one build configuration per variant unless some configuration
/// already produces the extension. Returns how many were added.
pub fn scaffold(project: &mut Pbxproj, config: &Config, env: &Env) -> usize {
  if project.has_config_producing(config.extension.name) {
    println!("  already configured, skipping");
    return 0;
  }

  let team = config.team(env).to_string();
  for variant in &config.project.variants {
    let object = build_config(variant, &team, config);
    project.append_object(pbx::new_id(), variant, object);
  }
  config.project.variants.len()
}

fn build_config(variant: &str, team: &str, config: &Config) -> Dict {
  let mut settings = Dict::new();
  settings.push(Str::plain("CODE_SIGN_IDENTITY"),         Value::string(""));
  settings.push(Str::plain("CODE_SIGN_STYLE"),            Value::string("Manual"));
  settings.push(Str::plain("DEVELOPMENT_TEAM"),           Value::string(team));
  settings.push(Str::plain("INFOPLIST_FILE"),             Value::string(config.ext_info_plist()));
  settings.push(Str::plain("IPHONEOS_DEPLOYMENT_TARGET"), Value::string(config.extension.deployment_target));
  settings.push(Str::plain("LD_RUNPATH_SEARCH_PATHS"),    Value::string(RUNPATHS));
  settings.push(Str::plain("PRODUCT_BUNDLE_IDENTIFIER"),  Value::string(config.ext_bundle_id()));
  settings.push(Str::plain("PRODUCT_NAME"),               Value::string(config.extension.name));
  settings.push(Str::plain("SKIP_INSTALL"),               Value::string("YES"));
  settings.push(Str::plain("SWIFT_VERSION"),              Value::string(config.extension.swift_version));
  settings.push(Str::plain("TARGETED_DEVICE_FAMILY"),     Value::string(config.extension.targeted_device_family()));

  let mut object = Dict::new();
  object.push(Str::plain("isa"),           Value::string("XCBuildConfiguration"));
  object.push(Str::plain("buildSettings"), Value::Dict(settings));
  object.push(Str::plain("name"),          Value::string(variant));
  object
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pbx::sample;
  use std::collections::HashSet;
  use std::path::PathBuf;

  fn in_memory(src: &str) -> Pbxproj {
    Pbxproj { path: PathBuf::from("project.pbxproj"), root: pbx::parse(src).unwrap() }
  }

  fn extension_configs(project: &Pbxproj) -> Vec<(String, Option<String>)> {
    project.objects().iter()
      .filter(|e| {
        e.value.as_dict()
          .and_then(|d| d.get_dict("buildSettings"))
          .and_then(|s| s.get_str("PRODUCT_NAME"))
          == Some("FileProviderExt")
      })
      .map(|e| (e.key.text.clone(), e.key.comment.clone()))
      .collect()
  }

  #[test]
  fn one_configuration_per_variant() {
    let mut project = in_memory(sample::RUNNER);
    let added = scaffold(&mut project, &Config::default(), &Env::default());
    assert_eq!(added, 3);
    assert_eq!(project.count_objects("XCBuildConfiguration"), 9);

    let configs = extension_configs(&project);
    let names: Vec<Option<String>> = configs.iter().map(|(_, c)| c.clone()).collect();
    assert_eq!(names, vec![
      Some("Debug".to_string()),
      Some("Release".to_string()),
      Some("Profile".to_string())
    ]);

    let ids: HashSet<&String> = configs.iter().map(|(id, _)| id).collect();
    assert_eq!(ids.len(), 3);
    assert!(configs.iter().all(|(id, _)| id.len() == 24));
  }

  #[test]
  fn each_configuration_carries_the_full_settings_block() {
    let mut project = in_memory(sample::RUNNER);
    scaffold(&mut project, &Config::default(), &Env::default());

    for (id, _) in extension_configs(&project) {
      let settings = project.object(&id).unwrap().get_dict("buildSettings").unwrap();
      assert_eq!(settings.len(), 11);
      assert_eq!(settings.get_str("CODE_SIGN_IDENTITY"), Some(""));
      assert_eq!(settings.get_str("CODE_SIGN_STYLE"), Some("Manual"));
      assert_eq!(settings.get_str("DEVELOPMENT_TEAM"), Some(""));
      assert_eq!(settings.get_str("INFOPLIST_FILE"), Some("FileProviderExt/Info.plist"));
      assert_eq!(settings.get_str("IPHONEOS_DEPLOYMENT_TARGET"), Some("16.0"));
      assert_eq!(settings.get_str("LD_RUNPATH_SEARCH_PATHS"), Some(RUNPATHS));
      assert_eq!(settings.get_str("PRODUCT_BUNDLE_IDENTIFIER"), Some("com.drivesync.app.FileProvider"));
      assert_eq!(settings.get_str("PRODUCT_NAME"), Some("FileProviderExt"));
      assert_eq!(settings.get_str("SKIP_INSTALL"), Some("YES"));
      assert_eq!(settings.get_str("SWIFT_VERSION"), Some("5.0"));
      assert_eq!(settings.get_str("TARGETED_DEVICE_FAMILY"), Some("2"));
    }
  }

  #[test]
  fn second_scaffold_adds_nothing() {
    let mut project = in_memory(sample::RUNNER);
    assert_eq!(scaffold(&mut project, &Config::default(), &Env::default()), 3);
    assert_eq!(scaffold(&mut project, &Config::default(), &Env::default()), 0);
    assert_eq!(project.count_objects("XCBuildConfiguration"), 9);
  }

  #[test]
  fn custom_variants_and_team_flow_through() {
    let mut project = in_memory(sample::RUNNER);
    let mut config  = Config::default();
    config.project.variants = vec!["Debug", "Release"];
    let env = Env { xcprep_team: Some("A1B2C3D4E5".to_string()) };

    assert_eq!(scaffold(&mut project, &config, &env), 2);
    for (id, _) in extension_configs(&project) {
      let settings = project.object(&id).unwrap().get_dict("buildSettings").unwrap();
      assert_eq!(settings.get_str("DEVELOPMENT_TEAM"), Some("A1B2C3D4E5"));
    }
  }
}
