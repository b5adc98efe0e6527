#![allow(clippy::cognitive_complexity)]

#![cfg_attr(debug_assertions, allow(dead_code))]

mod cmd;
mod ctx;
mod patch;
mod pbx;

use clap::{Arg, App, SubCommand};
use semver::Version;
use std::error::Error;
use std::{fmt, fmt::{Display}};
use std::path::PathBuf;

fn main() {
  // Initialize.
  let commands = cmd::init();

  // Parse the environment variables.
  let env: ctx::Env = envy::from_env()
    .check(|| "Failed to parse environment variables");

  // Parse the command line.
  let args = App::new(env!("CARGO_PKG_NAME"))
    .version(env!("CARGO_PKG_VERSION"))
    .author(env!("CARGO_PKG_AUTHORS"))
    .about(env!("CARGO_PKG_DESCRIPTION"))
    .arg(Arg::with_name("ROOT")
         .help("App folder containing the native ios project")
         .required(false))
    .arg(Arg::with_name("config")
         .short("c")
         .long("config")
         .value_name("FILE")
         .help("Name of the tool configuration file")
         .takes_value(true))
    .subcommands(commands.iter().map(|(name, cmd)| {
      cmd.init(SubCommand::with_name(name))
    }))
    .get_matches();

  let root = args.value_of("ROOT")
    .map(PathBuf::from)
    .or_else(|| Some(std::env::current_dir().unwrap()))
    .unwrap();
  let root = root.canonicalize()
    .check(|| format!("Failed to resolve the app folder ({:?})", root));

  // Load the tool configuration file. The file is optional unless named
  // explicitly; without it every setting keeps its default.
  let mut bytes = Vec::new();
  let config: ctx::Config = {
    use std::io::Read;
    let path = root.join(args.value_of("config").unwrap_or("Xcprep.toml"));

    match path.is_file() {
      false => {
        args.value_of("config").is_none()
          .check(|| format!("Failed to open config file ({:?})", path));
        ctx::Config::default()
      }
      true => {
        let mut f = std::fs::File::open(&path)
          .check(|| format!("Failed to open config file ({:?})", path));

        f.read_to_end(&mut bytes)
          .check(|| format!("Failed to load config file ({:?})", path));

        toml::from_slice(&bytes)
          .check(|| format!("Failed to read the config file ({:?})", path))
      }
    }
  };

  is_supported(config.project.min_xcprep_version).check(|| "Min version check failed");

  // Execute the requested command.
  let ctx = ctx::Context {
    commands,
    root,
    args:   &args,
    config: &config,
    env:    &env
  };

  let cmd_name = ctx.args.subcommand_name().unwrap_or("configure");
  ctx.commands[cmd_name].run(&ctx)
    .check(|| format!("Failed to run command ({})", cmd_name));
}

#[derive(Debug)]
struct MinVerError {
  expected: Version,
  current:  Version
}

impl Display for MinVerError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "the configuration requires version {} but this is {}",
           self.expected, self.current)
  }
}

impl Error for MinVerError {}

fn is_supported(min_version: &str) -> ctx::DynResult<()> {
  if !min_version.is_empty() {
    let expected = Version::parse(min_version)?;
    let current  = Version::parse(env!("CARGO_PKG_VERSION")).unwrap();
    if expected > current {
      return Err(Box::new(MinVerError { expected, current }))
    }
  }
  Ok(())
}

trait Check {
  type R;
  fn check<F, S>(self, msg: F) -> Self::R where F: FnOnce() -> S, S: Display;
}

impl Check for bool {
  type R = ();
  fn check<F, S>(self, msg: F) where F: FnOnce() -> S, S: Display {
    if !self {
      fatal(msg());
    }
  }
}

impl<T, E> Check for Result<T, E> where E: Into<Box<dyn Error>> {
  type R = T;
  fn check<F, S>(self, msg: F) -> Self::R where F: FnOnce() -> S, S: Display {
    match self {
      Ok (v) => v,
      Err(e) => {
        let e: Box<dyn Error> = e.into();
        let mut text   = format!("{}: {}", msg(), e);
        let mut source = e.source();
        while let Some(cause) = source {
          text.push_str(&format!("\n  caused by: {}", cause));
          source = cause.source();
        }
        fatal(text)
      }
    }
  }
}

fn fatal<S: Display>(msg: S) -> ! {
  eprintln!("{}", msg);
  std::process::exit(1)
}
