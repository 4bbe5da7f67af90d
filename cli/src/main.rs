mod cli;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::*;
use log::info;
use planwright::{intent::normalize, parse_intent, render::render_svg, solve, SolveOptions};
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    let args = Cli::parse();
    match args.verbosity {
        0 => {}
        1 => SimpleLogger::new().with_level(log::LevelFilter::Warn).init()?,
        2 => SimpleLogger::new().with_level(log::LevelFilter::Info).init()?,
        _ => SimpleLogger::new().with_level(log::LevelFilter::max()).init()?,
    }

    match args.subcommand {
        Commands::Compile {
            file,
            emit_json,
            emit_svg,
            pretty,
            inspect,
            out_dir,
            render_options,
        } => {
            let intent = read_intent(&file)?;
            let options = SolveOptions {
                inspect,
                ..SolveOptions::default()
            };

            let solution = match solve(intent, &options) {
                Ok(solution) => solution,
                Err(error) => {
                    if let Some(partial) = error.partial_state() {
                        for failure in &partial.failures {
                            eprintln!("{failure}");
                        }
                    }
                    bail!("solve failed: {error}");
                }
            };

            if let Some(trace) = &solution.trace {
                eprint!("{trace}");
            }

            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "plan".to_string());
            let dir = out_dir
                .or_else(|| file.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));

            if emit_svg {
                let svg = render_svg(&solution.state, Some(&solution.score), &render_options);
                let path = dir.join(format!("{stem}.svg"));
                fs::write(&path, svg).with_context(|| format!("couldn't write {}", path.display()))?;
                println!("wrote {}", path.display());
            }
            if emit_json {
                let json = if pretty {
                    serde_json::to_string_pretty(&solution)?
                } else {
                    serde_json::to_string(&solution)?
                };
                let path = dir.join(format!("{stem}.json"));
                fs::write(&path, json).with_context(|| format!("couldn't write {}", path.display()))?;
                println!("wrote {}", path.display());
            }

            info!(
                "plan: {} rooms placed, score {:.1}",
                solution.state.placed.len(),
                solution.score.total
            );
        }

        Commands::Score { file } => {
            let intent = read_intent(&file)?;
            let solution = solve(intent, &SolveOptions::default()).map_err(|e| anyhow::anyhow!("solve failed: {e}"))?;
            for (name, value) in &solution.score.components {
                println!("{name:>14}: {value:>7.2}");
            }
            println!("{:>14}: {:>7.2}", "total", solution.score.total);
        }

        Commands::Check { file } => {
            let intent = read_intent(&file)?;
            let normalized = normalize(intent).map_err(|e| anyhow::anyhow!("invalid intent: {e}"))?;
            println!(
                "ok: {} rooms, {} bands, {} depths",
                normalized.rooms.len(),
                normalized.bands.len(),
                normalized.depths.len()
            );
        }
    }

    Ok(())
}

fn read_intent(path: &Path) -> Result<planwright::intent::LayoutIntent> {
    let text = fs::read_to_string(path).with_context(|| format!("couldn't read {}", path.display()))?;
    parse_intent(&text).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}
