//! Entitlements wiring. The main app's entitlements file is authored by
//! hand and only registered here; the extension's file is generated whole
//! because nothing else creates it.

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

use crate::ctx::{Config, DynResult, StrError};
use crate::pbx::Pbxproj;

const FILE_TYPE: &str = "text.plist.entitlements";

/// Points CODE_SIGN_ENTITLEMENTS at the app's entitlements file when that
/// file exists on disk, registering it with the project the first time.
/// Returns whether the link was made.
pub fn link_main(project: &mut Pbxproj, root: &Path, config: &Config) -> DynResult<bool> {
  println!("Configuring entitlements...");
  if !config.main_entitlements_path(root).is_file() {
    return Ok(false);
  }

  // Registered relative to the project folder, the same base Xcode uses
  // for the build setting below.
  let setting = config.entitlements_setting(root);
  if !project.has_file_ref(&setting) {
    let group = project.main_group_id()
      .map(str::to_string)
      .ok_or_else(|| StrError("project has no main group".to_string()))?;
    project.add_file_ref(&setting, FILE_TYPE, &group)?;
  }

  for id in project.target_config_ids(config.project.target) {
    let name = project.config_name(&id).map(str::to_string);
    if let Some(settings) = project.settings_mut(&id) {
      settings.set("CODE_SIGN_ENTITLEMENTS", &setting[..]);
      if let Some(name) = name {
        println!("  set entitlements for {}", name);
      }
    }
  }
  Ok(true)
}

/// Writes the extension's entitlements when the file is absent: one app
/// group and one keychain access group, both derived from the app bundle
/// id. An existing file is never touched, so manual edits survive reruns.
pub fn ensure_extension(root: &Path, config: &Config) -> DynResult<bool> {
  let path = config.ext_entitlements_path(root);
  if path.is_file() {
    return Ok(false);
  }
  println!("Creating extension entitlements file...");

  create_dir_all(config.ext_dir(root))?;
  let mut f = File::create(&path)?;

  f.write_all(format!(concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#, "\n",
    r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#, "\n",
    r#"<plist version="1.0">"#, "\n",
    "<dict>\n",
    "\t<key>com.apple.security.application-groups</key>\n",
    "\t<array>\n",
    "\t\t<string>{group}</string>\n",
    "\t</array>\n",
    "\t<key>keychain-access-groups</key>\n",
    "\t<array>\n",
    "\t\t<string>{keychain}</string>\n",
    "\t</array>\n",
    "</dict>\n",
    "</plist>\n"),
    group    = config.app_group(),
    keychain = config.keychain_group()).as_bytes())?;

  f.flush()?;
  Ok(true)
}
