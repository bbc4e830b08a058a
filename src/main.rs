// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colorful::Colorful;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use tapcheckr::cli::format_verdict;
use tapcheckr::{
    AnalysisParams, StimulusDescriptor, StimulusPreparer, TapAnalyzer, TappingPreset,
};

#[derive(Parser, Debug)]
#[command(name = "tapcheckr")]
#[command(about = "Prepare tapping stimuli and score tap-to-beat recordings")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prepare stimuli: embed markers and write waveform + descriptor
    Prepare {
        /// Source music file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for prepared stimuli
        #[arg(short, long, default_value = "stimuli")]
        output: PathBuf,

        /// Stimulus name (defaults to the source file stem; single file
        /// only)
        #[arg(long)]
        name: Option<String>,
    },

    /// Score one recorded trial against a prepared stimulus
    Analyze {
        /// Recorded tapping audio
        #[arg(short, long)]
        recording: PathBuf,

        /// Stimulus descriptor JSON written by `prepare`
        #[arg(short, long)]
        info: PathBuf,

        /// Write a tapping plot PNG
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,

        /// Parameter preset (sms_tapping, unconstrained)
        #[arg(long, default_value = "sms_tapping")]
        preset: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.command {
        Command::Prepare {
            input,
            output,
            name,
        } => prepare(input, output, name.as_deref()),
        Command::Analyze {
            recording,
            info,
            plot,
            json,
            preset,
        } => analyze(recording, info, plot.as_deref(), *json, preset, args.verbose),
    }
}

fn prepare(input: &Path, output: &Path, name: Option<&str>) -> Result<()> {
    let sources = collect_audio_files(input)?;
    if sources.is_empty() {
        println!("{}", "No audio files found!".red());
        return Ok(());
    }
    if name.is_some() && sources.len() > 1 {
        anyhow::bail!("--name only applies to a single input file");
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    println!("Found {} source file(s)\n", sources.len());
    let preparer = StimulusPreparer::new();

    for source in sources {
        let stim_name = match name {
            Some(name) => name.to_string(),
            None => source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("stimulus")
                .to_string(),
        };

        println!("Preparing: {}", source.display().to_string().cyan());
        let prepared = preparer
            .prepare(&stim_name, &source)
            .with_context(|| format!("Failed to prepare {}", source.display()))?;

        let wav_path = output.join(format!("{stim_name}.wav"));
        let json_path = output.join(format!("{stim_name}.json"));
        preparer.save_waveform(&prepared.waveform, &wav_path)?;
        prepared.descriptor.save_json(&json_path)?;

        println!(
            "  {} {} beats, {:.1}s, {} + {}",
            "✓".green(),
            prepared.descriptor.expected_count(),
            prepared.descriptor.duration_secs(),
            wav_path.display(),
            json_path.display()
        );
    }

    Ok(())
}

fn analyze(
    recording: &Path,
    info: &Path,
    plot: Option<&Path>,
    json: bool,
    preset: &str,
    verbose: bool,
) -> Result<()> {
    let preset = TappingPreset::from_name(preset)
        .with_context(|| format!("Unknown preset: {preset}"))?;
    let descriptor = StimulusDescriptor::load_json(info)
        .with_context(|| format!("Failed to load descriptor {}", info.display()))?;

    let analyzer = TapAnalyzer::with_params(AnalysisParams::from_preset(preset));
    let verdict = match plot {
        Some(plot_path) => analyzer.analyze_file_with_plot(recording, &descriptor, plot_path),
        None => analyzer.analyze_file(recording, &descriptor),
    };

    // A failed verdict is a result, not an error: exit 0 either way
    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print!("{}", format_verdict(&verdict, verbose));
        if let Some(plot_path) = plot {
            println!("  Plot saved to: {}", plot_path.display());
        }
    }

    Ok(())
}

fn collect_audio_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let audio_extensions = ["flac", "wav", "mp3", "ogg", "m4a", "aac"];

    if path.is_file() {
        if let Some(ext) = path.extension() {
            if audio_extensions.contains(&ext.to_str().unwrap_or("").to_lowercase().as_str()) {
                files.push(path.to_path_buf());
            }
        }
    } else if path.is_dir() {
        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if let Some(ext) = path.extension() {
                if audio_extensions.contains(&ext.to_str().unwrap_or("").to_lowercase().as_str()) {
                    files.push(path.to_path_buf());
                }
            }
        }
        files.sort();
    }

    Ok(files)
}
