use clap::{App, ArgMatches};
use serde::Deserialize;
use serde_repr::Deserialize_repr;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub trait Command {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b>;

  fn run(&self, ctx: &Context) -> RunResult;
}

pub type DynResult<T> = Result<T, Box<dyn std::error::Error>>;
pub type RunResult    = DynResult<()>;

pub type Commands = BTreeMap<&'static str, Box<dyn Command>>;

#[derive(Debug)]
pub struct StrError(pub String);

impl std::fmt::Display for StrError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl std::error::Error for StrError {}

pub struct Context<'a> {
  pub commands: Commands,

  /// Folder every configured path is resolved against.
  pub root: PathBuf,

  pub args:   &'a ArgMatches<'a>,
  pub config: &'a Config<'a>,
  pub env:    &'a Env
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Env {
  pub xcprep_team: Option<String>
}

/// Read from Xcprep.toml when present. Every key is optional; the defaults
/// describe the stock Drive Sync layout, so running without a configuration
/// file patches the app exactly like the original setup script.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct Config<'a> {
  #[serde(borrow)]
  pub project: ProjectInfo<'a>,

  #[serde(borrow)]
  pub app: AppInfo<'a>,

  #[serde(borrow)]
  pub extension: ExtensionInfo<'a>
}

#[derive(Debug, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct ProjectInfo<'a> {
  /// Native project folder, relative to the root.
  pub path:   &'a str,
  pub target: &'a str,

  /// Build configuration names the extension scaffold emits.
  #[serde(borrow)]
  pub variants: Vec<&'a str>,

  pub min_xcprep_version: &'a str
}

impl Default for ProjectInfo<'_> {
  fn default() -> Self {
    ProjectInfo {
      path:     "ios",
      target:   "Runner",
      variants: vec!["Debug", "Release", "Profile"],
      min_xcprep_version: ""
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct AppInfo<'a> {
  pub bundle_id:         &'a str,
  pub deployment_target: &'a str,

  /// Development team id. Blank keeps signing fully manual.
  pub team: &'a str
}

impl Default for AppInfo<'_> {
  fn default() -> Self {
    AppInfo {
      bundle_id:         "com.drivesync.app",
      deployment_target: "16.0",
      team:              ""
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct ExtensionInfo<'a> {
  pub name:              &'a str,
  pub bundle_suffix:     &'a str,
  pub deployment_target: &'a str,
  pub swift_version:     &'a str,
  pub device_family:     Vec<DeviceFamily>
}

impl Default for ExtensionInfo<'_> {
  fn default() -> Self {
    ExtensionInfo {
      name:              "FileProviderExt",
      bundle_suffix:     "FileProvider",
      deployment_target: "16.0",
      swift_version:     "5.0",
      device_family:     vec![DeviceFamily::Ipad]
    }
  }
}

impl ExtensionInfo<'_> {
  /// TARGETED_DEVICE_FAMILY value, Apple's comma-joined numeric codes.
  pub fn targeted_device_family(&self) -> String {
    let codes: Vec<String> = self.device_family.iter().map(|f| (*f as u8).to_string()).collect();
    codes.join(",")
  }
}

#[derive(Clone, Copy, Debug, Deserialize_repr, PartialEq)]
#[repr(u8)]
pub enum DeviceFamily {
  Iphone = 1,
  Ipad   = 2
}

impl<'a> Config<'a> {
  pub fn project_dir(&self, root: &Path) -> PathBuf {
    root.join(self.project.path)
  }

  pub fn pbxproj_path(&self, root: &Path) -> PathBuf {
    self.project_dir(root)
      .join([self.project.target, ".xcodeproj"].join(""))
      .join("project.pbxproj")
  }

  pub fn main_entitlements_path(&self, root: &Path) -> PathBuf {
    self.project_dir(root)
      .join(self.project.target)
      .join([self.project.target, ".entitlements"].join(""))
  }

  /// CODE_SIGN_ENTITLEMENTS value: the entitlements file relative to the
  /// project folder, forward slashes regardless of host.
  pub fn entitlements_setting(&self, root: &Path) -> String {
    let diff = pathdiff::diff_paths(&self.main_entitlements_path(root), &self.project_dir(root));
    let path = match diff {
      Some(path) => path,
      None       => PathBuf::from([self.project.target, ".entitlements"].join(""))
    };
    path.to_string_lossy().replace('\\', "/")
  }

  pub fn ext_dir(&self, root: &Path) -> PathBuf {
    self.project_dir(root).join(self.extension.name)
  }

  pub fn ext_entitlements_path(&self, root: &Path) -> PathBuf {
    self.ext_dir(root).join([self.extension.name, ".entitlements"].join(""))
  }

  pub fn ext_bundle_id(&self) -> String {
    [self.app.bundle_id, ".", self.extension.bundle_suffix].join("")
  }

  pub fn ext_info_plist(&self) -> String {
    [self.extension.name, "/Info.plist"].join("")
  }

  pub fn app_group(&self) -> String {
    ["group.", self.app.bundle_id].join("")
  }

  pub fn keychain_group(&self) -> String {
    ["$(AppIdentifierPrefix)", self.app.bundle_id].join("")
  }

  /// Development team to write, environment override first.
  pub fn team<'e>(&'e self, env: &'e Env) -> &'e str {
    match &env.xcprep_team {
      Some(team) => team,
      None       => self.app.team
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_describe_the_stock_layout() {
    let config = Config::default();
    assert_eq!(config.project.path, "ios");
    assert_eq!(config.project.target, "Runner");
    assert_eq!(config.project.variants, vec!["Debug", "Release", "Profile"]);
    assert_eq!(config.app.bundle_id, "com.drivesync.app");
    assert_eq!(config.app.deployment_target, "16.0");
    assert_eq!(config.extension.name, "FileProviderExt");
    assert_eq!(config.extension.swift_version, "5.0");
    assert_eq!(config.extension.targeted_device_family(), "2");
  }

  #[test]
  fn toml_overrides_merge_with_defaults() {
    let bytes = br#"
[app]
bundle_id = "com.example.notes"

[extension]
device_family = [1, 2]
"#;
    let config: Config = toml::from_slice(bytes).unwrap();
    assert_eq!(config.app.bundle_id, "com.example.notes");
    assert_eq!(config.app.deployment_target, "16.0");
    assert_eq!(config.project.target, "Runner");
    assert_eq!(config.extension.targeted_device_family(), "1,2");
    assert_eq!(config.ext_bundle_id(), "com.example.notes.FileProvider");
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(toml::from_slice::<Config>(b"[app]\nbundleid = \"x\"\n").is_err());
    assert!(toml::from_slice::<Config>(b"[signing]\nteam = \"x\"\n").is_err());
  }

  #[test]
  fn derived_paths_and_groups() {
    let config = Config::default();
    let root   = Path::new("/work/drive");
    assert_eq!(config.pbxproj_path(root),
               PathBuf::from("/work/drive/ios/Runner.xcodeproj/project.pbxproj"));
    assert_eq!(config.main_entitlements_path(root),
               PathBuf::from("/work/drive/ios/Runner/Runner.entitlements"));
    assert_eq!(config.entitlements_setting(root), "Runner/Runner.entitlements");
    assert_eq!(config.ext_entitlements_path(root),
               PathBuf::from("/work/drive/ios/FileProviderExt/FileProviderExt.entitlements"));
    assert_eq!(config.ext_info_plist(), "FileProviderExt/Info.plist");
    assert_eq!(config.app_group(), "group.com.drivesync.app");
    assert_eq!(config.keychain_group(), "$(AppIdentifierPrefix)com.drivesync.app");
  }

  #[test]
  fn entitlements_setting_follows_the_configured_names() {
    let mut config = Config::default();
    config.project.path   = "native/ios";
    config.project.target = "DriveSync";

    let root = Path::new("/work/app");
    assert_eq!(config.entitlements_setting(root), "DriveSync/DriveSync.entitlements");
    assert_eq!(config.main_entitlements_path(root),
               PathBuf::from("/work/app/native/ios/DriveSync/DriveSync.entitlements"));
  }

  #[test]
  fn team_prefers_the_environment() {
    let config = Config::default();
    assert_eq!(config.team(&Env::default()), "");

    let env = Env { xcprep_team: Some("A1B2C3D4E5".to_string()) };
    assert_eq!(config.team(&env), "A1B2C3D4E5");
  }
}
