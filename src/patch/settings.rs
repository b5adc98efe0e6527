//! Signing settings for the main application target.

use crate::ctx::{Config, Env};
use crate::pbx::Pbxproj;

/// Overwrites the fixed signing set on every configuration of the main
/// target that carries a buildSettings dictionary. No merging: whatever
/// Xcode or a previous run left there loses. Returns the number of
/// configurations touched; a configuration without buildSettings is
/// skipped, never given one.
pub fn apply(project: &mut Pbxproj, config: &Config, env: &Env) -> usize {
  println!("Configuring main {} target...", config.project.target);

  if project.target_id(config.project.target).is_none() {
    println!("  target '{}' not found, nothing to update", config.project.target);
    return 0;
  }

  let team = config.team(env).to_string();
  let mut updated = 0;

  for id in project.target_config_ids(config.project.target) {
    let settings = match project.settings_mut(&id) {
      Some(settings) => settings,
      None           => continue
    };
    settings.set("PRODUCT_BUNDLE_IDENTIFIER",         config.app.bundle_id);
    settings.set("IPHONEOS_DEPLOYMENT_TARGET",        config.app.deployment_target);
    settings.set("CODE_SIGN_STYLE",                   "Manual");
    settings.set("CODE_SIGN_IDENTITY",                "");
    settings.set("CODE_SIGN_IDENTITY[sdk=iphoneos*]", "");
    settings.set("DEVELOPMENT_TEAM",                  &team[..]);
    settings.set("PROVISIONING_PROFILE",              "");
    settings.set("PROVISIONING_PROFILE_SPECIFIER",    "");
    updated += 1;

    if let Some(plist) = settings.get_str("INFOPLIST_FILE") {
      println!("  using Info.plist at {}", plist);
    }
  }
  updated
}
