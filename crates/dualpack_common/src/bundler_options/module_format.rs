use serde::Deserialize;

use crate::OutputFormat;

/// Module formats requested for one entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
  Commonjs,
  #[default]
  Esm,
  Both,
}

impl ModuleFormat {
  /// Compile order of the requested formats.
  pub fn output_formats(self) -> &'static [OutputFormat] {
    match self {
      Self::Commonjs => &[OutputFormat::Cjs],
      Self::Esm => &[OutputFormat::Esm],
      Self::Both => &[OutputFormat::Esm, OutputFormat::Cjs],
    }
  }

  pub fn includes_commonjs(self) -> bool {
    matches!(self, Self::Commonjs | Self::Both)
  }
}

impl std::str::FromStr for ModuleFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "commonjs" | "cjs" => Ok(Self::Commonjs),
      "esm" => Ok(Self::Esm),
      "both" => Ok(Self::Both),
      _ => Err(format!("Invalid format \"{s}\", expected \"commonjs\", \"esm\" or \"both\".")),
    }
  }
}
