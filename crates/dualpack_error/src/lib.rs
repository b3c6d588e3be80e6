mod diagnostic;

use std::ops::{Deref, DerefMut};

pub use crate::diagnostic::BuildDiagnostic;

/// A batch of fatal findings. Checkpoints report everything they found at once.
#[derive(Debug)]
pub struct BuildError(pub Vec<anyhow::Error>);

impl BuildError {
  /// Finds the first error in the batch that is a [`BuildDiagnostic`].
  pub fn diagnostic(&self) -> Option<&BuildDiagnostic> {
    self.0.iter().find_map(|error| error.downcast_ref::<BuildDiagnostic>())
  }
}

impl Deref for BuildError {
  type Target = Vec<anyhow::Error>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for BuildError {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self(vec![error])
  }
}

impl From<Vec<anyhow::Error>> for BuildError {
  fn from(errors: Vec<anyhow::Error>) -> Self {
    Self(errors)
  }
}

impl From<BuildDiagnostic> for BuildError {
  fn from(diagnostic: BuildDiagnostic) -> Self {
    Self(vec![diagnostic.into()])
  }
}

impl From<Vec<BuildDiagnostic>> for BuildError {
  fn from(diagnostics: Vec<BuildDiagnostic>) -> Self {
    Self(diagnostics.into_iter().map(anyhow::Error::from).collect())
  }
}

impl std::fmt::Display for BuildError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (index, error) in self.0.iter().enumerate() {
      if index > 0 {
        writeln!(f)?;
      }
      write!(f, "{error}")?;
    }
    Ok(())
  }
}

pub type BuildResult<T> = anyhow::Result<T, BuildError>;

#[test]
fn keeps_every_error_of_a_checkpoint() {
  let error = BuildError::from(vec![
    BuildDiagnostic::UnsupportedExtension { file: "src/a.js".to_string() },
    BuildDiagnostic::UnsupportedExtension { file: "src/b.jsx".to_string() },
  ]);

  assert_eq!(error.len(), 2);
  assert_eq!(
    error.to_string(),
    "src/a.js has no valid TypeScript extension\nsrc/b.jsx has no valid TypeScript extension"
  );
  assert!(matches!(error.diagnostic(), Some(BuildDiagnostic::UnsupportedExtension { .. })));
}
