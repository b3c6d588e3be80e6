mod args;
mod logger;

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
  time::Instant,
};

use ansi_term::Colour;
use args::Args;
use clap::Parser;

use dualpack::{
  BuildResult, BundleOutput, Bundler, BundlerOptions, EntryOutput, EntryPointOptions, ExportPath,
  OsFileSystem, load_config,
};

fn print_entry_output(entry: &EntryOutput, cwd: &Path) {
  let label = entry.export_path.subpath().map_or_else(|| "Main".to_string(), ToString::to_string);
  for (format, elapsed) in &entry.compiled {
    let elapsed = format!("{:.2} ms", elapsed.as_secs_f64() * 1000.0);
    println!(
      "{} Compiled {format} {label} output in {}",
      Colour::Green.paint("✔"),
      Colour::White.bold().paint(elapsed)
    );
  }

  let dim = Colour::White.dimmed();
  let files = entry
    .files
    .iter()
    .map(|file| {
      let path = file.path.strip_prefix(cwd).unwrap_or(&file.path).display().to_string();
      (path, format!("{:.2}", file.size as f64 / 1024.0))
    })
    .collect::<Vec<_>>();
  let left = files.iter().map(|(path, _)| path.len()).max().unwrap_or(0);
  let right = files.iter().map(|(_, size)| size.len()).max().unwrap_or(0);
  for (path, size) in files {
    println!(
      "  {}{:path_pad$} {}{:size_pad$}{size} kB",
      Colour::Cyan.paint(&path),
      "",
      dim.paint("│ size: "),
      "",
      path_pad = left - path.len(),
      size_pad = right - size.len(),
    );
  }
}

async fn run(args: &Args, cwd: PathBuf) -> BuildResult<BundleOutput> {
  let mut options = match &args.entry {
    Some(entry) => BundlerOptions {
      entry_points: Some(vec![EntryPointOptions {
        entry: entry.clone(),
        export_path: ExportPath::new("."),
        format: args.format.map(Into::into),
        tsconfig: None,
        rename_duplicates: None,
      }]),
      cwd: Some(cwd),
      ..Default::default()
    },
    None => {
      let mut options = load_config(&OsFileSystem, &cwd, args.config.as_deref())?;
      if let Some(format) = args.format {
        for entry_point in options.entry_points.iter_mut().flatten() {
          entry_point.format = Some(format.into());
        }
      }
      options
    }
  };

  if let Some(out_dir) = &args.out_dir {
    options.out_dir = Some(out_dir.clone());
  }
  if args.minify {
    options.minify = Some(true);
  }
  if args.no_package_json {
    options.allow_update_package_json = Some(false);
  }

  Bundler::new(options)?.write().await
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Args::parse();
  logger::init_logger(args.silent);

  let current_dir = match std::env::current_dir() {
    Ok(current_dir) => current_dir,
    Err(err) => {
      eprintln!("{} {err}", Colour::Red.paint("Error:"));
      return ExitCode::FAILURE;
    }
  };
  let cwd = args.cwd.as_ref().map_or_else(|| current_dir.clone(), |cwd| current_dir.join(cwd));

  let start = Instant::now();
  match run(&args, cwd.clone()).await {
    Ok(output) => {
      if !args.silent {
        for entry in &output.entries {
          print_entry_output(entry, &cwd);
        }
        if !output.warnings.is_empty() {
          println!(
            "{} {} warning(s), see above",
            Colour::Yellow.paint("⚠"),
            output.warnings.len()
          );
        }
        let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
        println!(
          "\n{} Finished in {}",
          Colour::Green.paint("✔"),
          Colour::White.bold().paint(elapsed)
        );
      }
      ExitCode::SUCCESS
    }
    Err(errors) => {
      for error in &*errors {
        eprintln!("{} {error}", Colour::Red.paint("Error:"));
      }
      ExitCode::FAILURE
    }
  }
}
