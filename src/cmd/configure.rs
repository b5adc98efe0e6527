use clap::{App};

use crate::ctx::{Command, Context, RunResult};
use crate::patch;

pub struct Configure;

impl Command for Configure {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.about("Patches the Xcode project for manual signing and the file provider extension")
  }

  fn run(&self, ctx: &Context) -> RunResult {
    let report = patch::run(&ctx.root, ctx.config, ctx.env)?;

    let team = ctx.config.team(ctx.env);
    let signing = match team.is_empty() {
      true  => "manual, no team".to_string(),
      false => ["manual, team ", team].join("")
    };
    let entitlements = match report.entitlements_linked {
      true  => "linked",
      false => "no main entitlements file"
    };

    println!();
    println!("Xcode project configured successfully!");
    println!();
    println!("Configuration summary:");
    println!("  bundle id:         {}", ctx.config.app.bundle_id);
    println!("  deployment target: iOS {}+", ctx.config.app.deployment_target);
    println!("  code signing:      {}", signing);
    println!("  entitlements:      {}", entitlements);
    println!("  app group:         {}", ctx.config.app_group());
    println!("  configurations:    {} updated, {} added",
             report.configs_updated, report.ext_configs_added);
    println!();
    println!("You can now build with: flutter build ios --release --no-codesign");
    Ok(())
  }
}
