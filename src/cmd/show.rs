use clap::{App, Arg};
use serde::Serialize;

use crate::ctx::{Command, Context, RunResult};
use crate::pbx::Pbxproj;

pub struct Show;

#[derive(Serialize)]
struct TargetSummary<'p> {
  name:           &'p str,
  configurations: Vec<ConfigSummary<'p>>
}

#[derive(Serialize)]
struct ConfigSummary<'p> {
  name:              Option<&'p str>,
  bundle_id:         Option<&'p str>,
  deployment_target: Option<&'p str>,
  sign_style:        Option<&'p str>,
  entitlements:      Option<&'p str>,
  product_name:      Option<&'p str>
}

impl Command for Show {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.about("Displays targets and their signing-relevant settings")
      .arg(Arg::with_name("json")
           .long("json")
           .help("Print the summary as JSON"))
  }

  fn run(&self, ctx: &Context) -> RunResult {
    let path    = ctx.config.pbxproj_path(&ctx.root);
    let project = Pbxproj::load(&path)?;

    let mut targets = Vec::new();
    for name in project.target_names() {
      let ids = project.target_config_ids(name);
      let configurations = ids.iter()
        .map(|id| summarize(&project, id))
        .collect();
      targets.push(TargetSummary { name, configurations });
    }

    let json = ctx.args.subcommand_matches("show")
      .map_or(false, |args| args.is_present("json"));
    if json {
      println!("{}", serde_json::to_string_pretty(&targets)?);
      return Ok(());
    }

    for target in &targets {
      println!("{}", target.name);
      for config in &target.configurations {
        println!("  {}", config.name.unwrap_or("?"));
        print_setting("bundle id",         config.bundle_id);
        print_setting("deployment target", config.deployment_target);
        print_setting("sign style",        config.sign_style);
        print_setting("entitlements",      config.entitlements);
        print_setting("product name",      config.product_name);
      }
    }
    Ok(())
  }
}

fn summarize<'p>(project: &'p Pbxproj, id: &str) -> ConfigSummary<'p> {
  let object   = project.object(id);
  let settings = object.and_then(|object| object.get_dict("buildSettings"));
  let get      = |key| settings.and_then(|settings| settings.get_str(key));

  ConfigSummary {
    name:              object.and_then(|object| object.get_str("name")),
    bundle_id:         get("PRODUCT_BUNDLE_IDENTIFIER"),
    deployment_target: get("IPHONEOS_DEPLOYMENT_TARGET"),
    sign_style:        get("CODE_SIGN_STYLE"),
    entitlements:      get("CODE_SIGN_ENTITLEMENTS"),
    product_name:      get("PRODUCT_NAME")
  }
}

fn print_setting(label: &str, value: Option<&str>) {
  if let Some(value) = value {
    println!("    {:<18} {}", label, value);
  }
}

#[cfg(test)]
mod tests {
  use crate::pbx::{self, sample};
  use std::path::PathBuf;

  fn in_memory(src: &str) -> pbx::Pbxproj {
    pbx::Pbxproj {
      path: PathBuf::from("project.pbxproj"),
      root: pbx::parse(src).unwrap()
    }
  }

  #[test]
  fn summarize_reads_the_interesting_settings() {
    let project = in_memory(sample::RUNNER);
    let ids     = project.target_config_ids("Runner");
    let debug   = ids.iter()
      .find(|id| project.config_name(id) == Some("Debug"))
      .unwrap();

    let summary = super::summarize(&project, debug);
    assert_eq!(summary.name, Some("Debug"));
    assert_eq!(summary.bundle_id, Some("com.example.placeholder"));
    assert_eq!(summary.deployment_target, None);
    assert_eq!(summary.entitlements, None);
  }

  #[test]
  fn summarize_tolerates_a_missing_object() {
    let project = in_memory(sample::MINIMAL);
    let summary = super::summarize(&project, "DEADBEEFDEADBEEFDEADBEEF");
    assert_eq!(summary.name, None);
    assert_eq!(summary.bundle_id, None);
  }
}
