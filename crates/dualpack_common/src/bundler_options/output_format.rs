use std::fmt::Display;

/// A single compile target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
  Esm,
  Cjs,
}

impl OutputFormat {
  #[inline]
  pub fn js_extension(self) -> &'static str {
    match self {
      Self::Esm => "mjs",
      Self::Cjs => "cjs",
    }
  }

  #[inline]
  pub fn dts_extension(self) -> &'static str {
    match self {
      Self::Esm => "d.mts",
      Self::Cjs => "d.cts",
    }
  }
}

impl Display for OutputFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Esm => write!(f, "ESM"),
      Self::Cjs => write!(f, "CommonJS"),
    }
  }
}
