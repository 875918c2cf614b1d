use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sc4_cartographer::export::save_bitmap;
use sc4_cartographer::persistence::{self, default_preset_path};
use sc4_cartographer::synthetic::{generate_city, SyntheticCityConfig};
use sc4_cartographer::{
    AppearanceModel, CityFile, CitySource, OutputFormat, PreviewOrchestrator, Result,
};

#[derive(Parser, Debug)]
#[command(name = "sc4_cartographer")]
#[command(about = "Render styled maps of SimCity 4 cities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a city map and save it as an image
    Render {
        #[command(flatten)]
        city: CityArgs,

        /// Appearance preset (.sc4cart) to render with
        #[arg(short, long)]
        appearance: Option<PathBuf>,

        /// Output directory (overrides the preset's output path)
        #[arg(short, long)]
        output: Option<String>,

        /// File name without extension (default: derived from the save name)
        #[arg(short, long)]
        name: Option<String>,

        /// Image format: png or jpeg
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Also write the zoomed preview as PNG to this path
        #[arg(long)]
        zoom_preview: Option<PathBuf>,
    },

    /// Describe the tile under a pixel of the rendered map
    Inspect {
        #[command(flatten)]
        city: CityArgs,

        #[arg(short, long)]
        appearance: Option<PathBuf>,

        #[arg(short, long, allow_negative_numbers = true)]
        x: i64,

        #[arg(short, long, allow_negative_numbers = true)]
        y: i64,

        /// Pixel coordinates refer to the zoomed preview
        #[arg(long)]
        zoomed: bool,
    },

    /// Manage appearance presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    /// Write the default appearance as a new preset
    Write {
        /// Directory to write map_appearance.sc4cart into
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Print a preset's contents
    Show { path: PathBuf },
}

#[derive(Args, Debug)]
struct CityArgs {
    /// Decoded city data as JSON
    #[arg(short, long, conflicts_with = "synthetic", required_unless_present = "synthetic")]
    city: Option<PathBuf>,

    /// Use a generated city instead of a save
    #[arg(long)]
    synthetic: bool,

    /// Random seed for the synthetic city
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Synthetic city width in tiles
    #[arg(long, default_value = "64")]
    width: usize,

    /// Synthetic city depth in tiles
    #[arg(long, default_value = "64")]
    depth: usize,

    /// Number of synthetic lots
    #[arg(long, default_value = "120")]
    lots: usize,
}

impl CityArgs {
    fn source(&self) -> Result<Box<dyn CitySource>> {
        match &self.city {
            Some(path) => Ok(Box::new(CityFile::open(path)?)),
            None => {
                let config = SyntheticCityConfig {
                    width: self.width,
                    depth: self.depth,
                    lots: self.lots,
                    seed: self.seed,
                    ..Default::default()
                };
                println!(
                    "Generating synthetic city {}x{} with seed: {}",
                    config.width, config.depth, config.seed
                );
                Ok(Box::new(generate_city(&config)))
            }
        }
    }
}

fn load_appearance(path: Option<&Path>) -> Result<AppearanceModel> {
    match path {
        Some(path) => persistence::load_from_file(path),
        None => Ok(AppearanceModel::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render {
            city,
            appearance,
            output,
            name,
            format,
            zoom_preview,
        } => {
            let mut model = load_appearance(appearance.as_deref())?;
            if let Some(output) = output {
                model.output_path = output;
            }
            if let Some(format) = format {
                model.output_format = format;
            }

            let source = city.source()?;
            let mut orchestrator = PreviewOrchestrator::new();
            let previews = orchestrator.render(source.as_ref(), &model)?;
            println!(
                "Preview: {}x{} px",
                previews.normal.width(),
                previews.normal.height()
            );

            if let Some(path) = zoom_preview {
                match &previews.zoomed {
                    Some(zoomed) => {
                        save_bitmap(zoomed, &path, OutputFormat::Png)?;
                        println!("Zoomed preview saved to: {}", path.display());
                    }
                    None => println!(
                        "No zoomed preview: segment size {} is already larger than the zoom",
                        model.grid_segment_size
                    ),
                }
            }

            let written = orchestrator.export_map(&model, name.as_deref())?;
            println!("Map saved to: {}", written.display());
        }

        Command::Inspect {
            city,
            appearance,
            x,
            y,
            zoomed,
        } => {
            let model = load_appearance(appearance.as_deref())?;
            let source = city.source()?;
            let mut orchestrator = PreviewOrchestrator::new();
            orchestrator.render(source.as_ref(), &model)?;
            if zoomed && !orchestrator.toggle_zoom() {
                println!("Zoom unavailable at segment size {}", model.grid_segment_size);
            }
            if let Some(info) = orchestrator.inspect(x, y, &model) {
                println!("{}", info);
            }
        }

        Command::Preset { action } => match action {
            PresetAction::Write { dir } => {
                let path = default_preset_path(&dir);
                persistence::save_to_file(&AppearanceModel::default(), &path)?;
                println!("Preset saved to: {}", path.display());
            }
            PresetAction::Show { path } => {
                let model = persistence::load_from_file(&path)?;
                println!("Grid segment size: {}", model.grid_segment_size);
                println!(
                    "Padding: {}x{}  Offset: {}x{}",
                    model.segment_padding_x,
                    model.segment_padding_y,
                    model.segment_offset_x,
                    model.segment_offset_y
                );
                println!(
                    "Grid lines: {}  Zone outlines: {}",
                    model.show_grid_lines, model.show_zone_outlines
                );
                println!("Output: {} ({})", model.output_path, model.output_format);
                println!("Colors:");
                for (role, color) in model.colors.iter() {
                    println!("  {:<20} {}", role.to_string(), color);
                }
                println!("Visible layers:");
                for layer in &model.visible_layers {
                    println!("  {}", layer);
                }
            }
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
