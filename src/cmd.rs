mod check;
mod configure;
mod show;

use crate::ctx::Commands;

pub fn init() -> Commands {
  let mut commands = Commands::new();
  commands.insert("check",     Box::new(check::Check));
  commands.insert("configure", Box::new(configure::Configure));
  commands.insert("show",      Box::new(show::Show));
  commands
}
