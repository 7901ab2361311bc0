use clap::Parser;
use log::{error, info};
use std::process::ExitCode;
use terrain_vertex::io::config::Config;
use terrain_vertex::io::report::{save_draped_lines, save_vertices_csv, value_range};
use terrain_vertex::pipeline::processor::VertexProcessor;
use terrain_vertex::scene::loader::{build_draped_lines, build_stage, load_terrain_mesh};

/// Runs the terrain vertex stage over a mesh and dumps its outputs.
#[derive(Parser, Debug)]
#[command(name = "terrain-vertex")]
#[command(about = "CPU terrain vertex stage driven by a TOML config")]
struct Cli {
    /// Config file (TOML). Defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Terrain mesh (.obj), overrides `stage.input`.
    #[arg(short, long, value_name = "FILE")]
    input: Option<String>,

    /// Per-vertex CSV output, overrides `stage.output`.
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Also write the packed draped-line block to this file.
    #[arg(long, value_name = "FILE")]
    draped_lines: Option<String>,
}

fn run(cli: Cli) -> terrain_vertex::Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config: {path}");
            Config::load(path)?
        }
        None => {
            info!("Using default settings");
            Config::default()
        }
    };

    if let Some(input) = cli.input {
        config.stage.input = Some(input);
    }
    if let Some(output) = cli.output {
        config.stage.output = output;
    }

    let mesh = load_terrain_mesh(&config)?;
    let stage = build_stage(&config);
    let processor = VertexProcessor::new(config.stage.chunk_size);

    let transformed = processor.process_mesh(&mesh, &stage);
    let varyings = &transformed.vertices.varyings;

    let height = value_range(varyings.iter().map(|v| v.world_position.y));
    let v_coord = value_range(varyings.iter().map(|v| v.uv.y));
    if let (Some((h_lo, h_hi)), Some((v_lo, v_hi))) = (height, v_coord) {
        info!("World height range: [{h_lo:.3}, {h_hi:.3}]");
        info!("Texture V range:    [{v_lo:.3}, {v_hi:.3}]");
    }

    save_vertices_csv(&config.stage.output, &transformed.vertices)?;

    if let Some(path) = cli.draped_lines {
        let lines = build_draped_lines(&config);
        info!(
            "Packing {} of {} draped lines",
            lines.count(),
            lines.lines.len()
        );
        save_draped_lines(path, &lines.pack(stage.model()))?;
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .format_level(true)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
