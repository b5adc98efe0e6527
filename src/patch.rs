//! Everything `configure` does to the native project, in the order the
//! build expects: signing settings, entitlements, save, then the extension
//! scaffold against a fresh parse of the saved file.

mod entitlements;
mod extension;
mod settings;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::ctx::{Config, DynResult, Env};
use crate::pbx::{self, Pbxproj};

/// What a run changed. A second run over the same tree reports no created
/// entitlements and no added configurations.
#[derive(Debug, Default)]
pub struct Report {
  pub configs_updated:          usize,
  pub entitlements_linked:      bool,
  pub ext_entitlements_created: bool,
  pub ext_configs_added:        usize
}

/// The descriptor expected by the configuration is not on disk. Lists any
/// projects that were found so a wrong root or target name is obvious.
#[derive(Debug)]
pub struct MissingDescriptor {
  pub path:  PathBuf,
  pub found: Vec<PathBuf>
}

impl fmt::Display for MissingDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "project file not found at {}", self.path.display())?;
    for candidate in &self.found {
      write!(f, "\n  found instead: {}", candidate.display())?;
    }
    Ok(())
  }
}

impl std::error::Error for MissingDescriptor {}

pub fn run(root: &Path, config: &Config, env: &Env) -> DynResult<Report> {
  let path = config.pbxproj_path(root);
  if !path.is_file() {
    return Err(Box::new(MissingDescriptor {
      path,
      found: pbx::discover_projects(&config.project_dir(root))
    }));
  }

  println!("Loading Xcode project...");
  let mut project = Pbxproj::load(&path)?;
  let mut report  = Report::default();

  report.configs_updated          = settings::apply(&mut project, config, env);
  report.entitlements_linked      = entitlements::link_main(&mut project, root, config)?;
  report.ext_entitlements_created = entitlements::ensure_extension(root, config)?;

  println!("Saving project file...");
  project.save()?;

  // The scaffold runs against a fresh parse of what was just saved, so its
  // presence probe sees exactly what the next run will see.
  println!("Adding extension '{}'...", config.extension.name);
  let mut project = Pbxproj::load(&path)?;
  report.ext_configs_added = extension::scaffold(&mut project, config, env);
  if report.ext_configs_added > 0 {
    project.save()?;
    println!("  added {} build configurations", report.ext_configs_added);
  }

  Ok(report)
}
