use clap::{App};
use std::path::Path;

use crate::ctx::{Command, Context, RunResult, StrError};
use crate::patch::MissingDescriptor;
use crate::pbx::{self, Pbxproj};

pub struct Check;

impl Command for Check {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.about("Verifies the project descriptor without changing anything")
  }

  fn run(&self, ctx: &Context) -> RunResult {
    let config = ctx.config;
    let path   = config.pbxproj_path(&ctx.root);
    if !path.is_file() {
      let found = pbx::discover_projects(&config.project_dir(&ctx.root));
      return Err(Box::new(MissingDescriptor { path, found }));
    }

    let project = Pbxproj::load(&path)?;
    println!("descriptor: {}", path.display());

    let target = config.project.target;
    if project.target_id(target).is_none() {
      return Err(Box::new(StrError(
        ["target '", target, "' not found in the project"].join("")
      )));
    }

    let ids = project.target_config_ids(target);
    println!("target:     {} ({} configurations)", target, ids.len());
    for id in &ids {
      let name = project.config_name(id).unwrap_or("?");
      let settings = project.object(id)
        .and_then(|object| object.get_dict("buildSettings"));
      match settings.is_some() {
        true  => println!("  {}", name),
        false => println!("  {} (no build settings)", name)
      }
    }
    for variant in &config.project.variants {
      if !ids.iter().any(|id| project.config_name(id) == Some(*variant)) {
        println!("note: target has no '{}' configuration", variant);
      }
    }

    println!("main entitlements:      {}",
             presence(&config.main_entitlements_path(&ctx.root)));
    println!("extension entitlements: {}",
             presence(&config.ext_entitlements_path(&ctx.root)));
    match project.has_config_producing(config.extension.name) {
      true  => println!("extension configurations: present"),
      false => println!("extension configurations: not yet added")
    }
    Ok(())
  }
}

fn presence(path: &Path) -> &'static str {
  match path.is_file() {
    true  => "present",
    false => "missing"
  }
}
