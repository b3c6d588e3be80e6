use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "dualpack", version, about, long_about = None)]
pub struct Args {
  /// Project directory, defaults to the current directory.
  #[clap(long)]
  pub cwd: Option<PathBuf>,

  /// Config file relative to the project directory.
  #[clap(long, short)]
  pub config: Option<PathBuf>,

  /// Build this file as the main export, without a config file.
  #[clap(long, short)]
  pub entry: Option<String>,

  #[clap(long, short)]
  pub format: Option<Format>,

  #[clap(long, short = 'd')]
  pub out_dir: Option<String>,

  #[clap(long, short)]
  pub minify: bool,

  /// Leave package.json untouched.
  #[clap(long)]
  pub no_package_json: bool,

  #[clap(long, short)]
  pub silent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum Format {
  Esm,
  #[value(alias = "cjs")]
  Commonjs,
  Both,
}

impl From<Format> for dualpack::ModuleFormat {
  fn from(value: Format) -> Self {
    match value {
      Format::Esm => dualpack::ModuleFormat::Esm,
      Format::Commonjs => dualpack::ModuleFormat::Commonjs,
      Format::Both => dualpack::ModuleFormat::Both,
    }
  }
}
