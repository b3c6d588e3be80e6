use std::{path::Path, process::Command};

use dualpack_common::{DependencyGraph, NormalizedEntryPoint};
use dualpack_error::{BuildDiagnostic, BuildResult};

/// Runs `tsc --noEmit` on the project. The compiler has to be installed in the project.
pub fn type_check(
  cwd: &Path,
  entry_point: &NormalizedEntryPoint,
  graph: &DependencyGraph,
) -> BuildResult<()> {
  let mut command = Command::new("npx");
  command.current_dir(cwd).args(["--no-install", "tsc", "--noEmit", "--pretty", "false"]);

  let project = entry_point.tsconfig.clone().or_else(|| {
    let default_config = cwd.join("tsconfig.json");
    default_config.is_file().then_some(default_config)
  });
  match project {
    Some(project) => {
      command.arg("-p").arg(project);
    }
    None => {
      command.args(["--skipLibCheck", "--target", "esnext", "--module", "esnext"]);
      command.args(["--moduleResolution", "bundler"]);
      command.args(graph.units.iter().map(|unit| unit.path.as_os_str()));
    }
  }

  tracing::debug!("Running type check: {command:?}");
  let output = command.output().map_err(|err| BuildDiagnostic::TypeCheckFailed {
    output: format!("Failed to run tsc: {err}"),
  })?;

  if output.status.success() {
    return Ok(());
  }
  let mut report = String::from_utf8_lossy(&output.stdout).into_owned();
  report.push_str(&String::from_utf8_lossy(&output.stderr));
  Err(BuildDiagnostic::TypeCheckFailed { output: report.trim_end().to_string() }.into())
}
