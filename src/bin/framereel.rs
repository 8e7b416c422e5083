use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framereel::{
    AssembleOptions, DEFAULT_EXTENSION, DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_WIDTH,
    FfmpegLogLevel, FrameAssembler, MalformedNamePolicy, ProgressCallback,
    ProgressInfo, ResizeFilter, VideoCodec, VideoProbe,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framereel\n  framereel assemble frames --out render.mp4 --no-clobber --width 1920 --height 1080 --fps 30\n  framereel list frames --json\n  framereel probe render.mp4\n  framereel completions zsh > _framereel";

#[derive(Debug, Parser)]
#[command(
    name = "framereel",
    version,
    about = "Assemble numbered image frames into a video",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    /// Defaults to `assemble` over the current directory.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar instead of per-frame indices.
    #[arg(long, global = true)]
    progress: bool,

    /// Refuse to replace an existing output file.
    #[arg(long, global = true)]
    no_clobber: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encode the frames of a directory into a video.
    #[command(
        about = "Assemble frames into a video",
        after_help = "Examples:\n  framereel assemble\n  framereel assemble frames --out clip.mp4 --codec mpeg4 --fps 12"
    )]
    Assemble(AssembleArgs),

    /// Print the frame order that `assemble` would use.
    #[command(about = "List frames in assembly order")]
    List {
        /// Frame directory.
        #[arg(default_value = ".")]
        directory: PathBuf,
        /// Frame file extension.
        #[arg(long, default_value = DEFAULT_EXTENSION)]
        ext: String,
        /// Leave non-numeric names out instead of failing.
        #[arg(long)]
        skip_malformed: bool,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print resolution, frame rate, and frame count of a video.
    #[command(about = "Inspect a video file", visible_alias = "info")]
    Probe {
        /// Video file.
        input: PathBuf,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args, Clone)]
struct AssembleArgs {
    /// Frame directory.
    #[arg(default_value = ".")]
    directory: PathBuf,
    /// Output video path (default: video.mp4 inside the frame directory).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output width in pixels.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,
    /// Output height in pixels.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    /// Output frame rate.
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,
    /// Codec: h264 | h265 | mpeg4.
    #[arg(long, default_value = "h264")]
    codec: String,
    /// Constant rate factor (h264/h265).
    #[arg(long)]
    crf: Option<u32>,
    /// Target bitrate in bits per second. Overrides --crf.
    #[arg(long)]
    bitrate: Option<usize>,
    /// Resize filter: nearest | triangle | catmullrom | gaussian | lanczos3.
    #[arg(long, default_value = "lanczos3")]
    filter: String,
    /// Frame file extension.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    ext: String,
    /// Leave non-numeric names out instead of failing.
    #[arg(long)]
    skip_malformed: bool,
}

impl Default for AssembleArgs {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            out: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            codec: "h264".to_string(),
            crf: None,
            bitrate: None,
            filter: "lanczos3".to_string(),
            ext: DEFAULT_EXTENSION.to_string(),
            skip_malformed: false,
        }
    }
}

fn parse_codec(value: &str) -> Option<VideoCodec> {
    match value.to_ascii_lowercase().as_str() {
        "h264" | "avc" | "x264" => Some(VideoCodec::H264),
        "h265" | "hevc" | "x265" => Some(VideoCodec::H265),
        "mpeg4" | "mp4v" => Some(VideoCodec::Mpeg4),
        _ => None,
    }
}

fn parse_filter(value: &str) -> Option<ResizeFilter> {
    match value.to_ascii_lowercase().as_str() {
        "nearest" => Some(ResizeFilter::Nearest),
        "triangle" | "bilinear" | "linear" => Some(ResizeFilter::Triangle),
        "catmullrom" | "cubic" | "bicubic" => Some(ResizeFilter::CatmullRom),
        "gaussian" => Some(ResizeFilter::Gaussian),
        "lanczos3" | "lanczos" => Some(ResizeFilter::Lanczos3),
        _ => None,
    }
}

fn malformed_policy(skip: bool) -> MalformedNamePolicy {
    if skip {
        MalformedNamePolicy::Skip
    } else {
        MalformedNamePolicy::Reject
    }
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = match &global.log_level {
        Some(level) => {
            FfmpegLogLevel::parse(level).ok_or(format!("unsupported --log-level: {level}"))?
        }
        None => FfmpegLogLevel::Error,
    };
    framereel::set_ffmpeg_log_level(level);
    Ok(())
}

fn assemble_options(
    args: &AssembleArgs,
    global: &GlobalOptions,
) -> Result<AssembleOptions, Box<dyn std::error::Error>> {
    let codec =
        parse_codec(&args.codec).ok_or(format!("unsupported --codec: {}", args.codec))?;
    let filter =
        parse_filter(&args.filter).ok_or(format!("unsupported --filter: {}", args.filter))?;

    let mut options = AssembleOptions::new()
        .resolution(args.width, args.height)
        .fps(args.fps)
        .codec(codec)
        .resize_filter(filter)
        .extension(&args.ext)
        .malformed_names(malformed_policy(args.skip_malformed))
        .overwrite(!global.no_clobber);

    if let Some(crf) = args.crf {
        options = options.crf(crf);
    }
    if let Some(bitrate) = args.bitrate {
        options = options.bitrate(bitrate);
    }
    if let Some(out) = &args.out {
        options = options.output(out);
    }

    Ok(options)
}

/// Prints the position of every frame on stdout before it is read.
struct FrameIndexPrinter;

impl ProgressCallback for FrameIndexPrinter {
    fn on_frame(&self, position: u64, _path: &Path) {
        println!("{position}");
    }

    fn on_progress(&self, _info: &ProgressInfo) {}
}

struct BarProgress {
    bar: ProgressBar,
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        match &info.current_path {
            Some(path) => self.bar.set_message(display_name(path)),
            None => self.bar.finish_with_message("done"),
        }
    }
}

/// `3, 7-9, 12` style listing; long lists are cut after a few runs.
fn describe_gaps(gaps: &[RangeInclusive<u64>]) -> String {
    const SHOWN: usize = 5;
    let mut parts: Vec<String> = gaps
        .iter()
        .take(SHOWN)
        .map(|gap| {
            if gap.start() == gap.end() {
                gap.start().to_string()
            } else {
                format!("{}-{}", gap.start(), gap.end())
            }
        })
        .collect();
    if gaps.len() > SHOWN {
        parts.push(format!("... ({} more)", gaps.len() - SHOWN));
    }
    parts.join(", ")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn run_assemble(
    args: &AssembleArgs,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = assemble_options(args, global)?;
    let assembler = FrameAssembler::new(options);

    let sequence = assembler.collect_and_sort_filenames(&args.directory)?;
    if sequence.is_empty() {
        return Err(format!(
            "no *.{} frames found in {}",
            assembler.options().extension,
            args.directory.display()
        )
        .into());
    }

    let output = assembler.options().output_path(&args.directory);
    if output.exists() {
        if global.no_clobber {
            return Err(format!(
                "output already exists: {} (drop --no-clobber to replace)",
                output.display()
            )
            .into());
        }
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("overwriting {}", output.display()).yellow()
        );
    }

    let callback: Arc<dyn ProgressCallback> = if global.progress {
        let bar = ProgressBar::new(sequence.len() as u64);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Arc::new(BarProgress { bar })
    } else {
        Arc::new(FrameIndexPrinter)
    };
    let assembler = FrameAssembler::new(assembler.options().clone().with_progress(callback));

    let report = assembler.assemble(&sequence, &output)?;

    if report.missing_frames > 0 {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!(
                "{} frame number(s) missing from the sequence: {}",
                report.missing_frames,
                describe_gaps(&report.gaps)
            )
            .yellow()
        );
    }
    eprintln!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "Wrote {} frame(s) at {}x{} @ {} fps to {} in {:.1}s",
            report.frames_written,
            report.width,
            report.height,
            report.fps,
            report.output.display(),
            report.elapsed.as_secs_f64(),
        )
        .green()
    );
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    apply_global_options(&cli.global)?;

    match cli.command {
        None => run_assemble(&AssembleArgs::default(), &cli.global)?,
        Some(Commands::Assemble(args)) => run_assemble(&args, &cli.global)?,
        Some(Commands::List {
            directory,
            ext,
            skip_malformed,
            json,
        }) => {
            let options = AssembleOptions::new()
                .extension(&ext)
                .malformed_names(malformed_policy(skip_malformed));
            let sequence = FrameAssembler::new(options).collect_and_sort_filenames(&directory)?;

            if json {
                let payload = json!({
                    "count": sequence.len(),
                    "frames": sequence.iter().map(|entry| json!({
                        "index": entry.index,
                        "path": entry.path.display().to_string(),
                    })).collect::<Vec<_>>(),
                    "gaps": sequence.gaps().iter().map(|gap| json!({
                        "first": gap.start(),
                        "last": gap.end(),
                    })).collect::<Vec<_>>(),
                    "missing_frames": sequence.missing_frames(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (position, entry) in sequence.iter().enumerate() {
                    println!("{position}\t{}\t{}", entry.index, entry.path.display());
                }
                let gaps = sequence.gaps();
                if !gaps.is_empty() {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!("missing frame numbers: {}", describe_gaps(&gaps)).yellow()
                    );
                }
            }
        }
        Some(Commands::Probe { input, json }) => {
            let summary = VideoProbe::probe(&input)?;
            if json {
                let payload = json!({
                    "width": summary.width,
                    "height": summary.height,
                    "fps": summary.frames_per_second,
                    "frame_count": summary.frame_count,
                    "codec": summary.codec,
                    "duration_seconds": summary.duration.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    summary.width, summary.height, summary.frames_per_second, summary.codec,
                );
                println!("Frames: {}", summary.frame_count);
                println!("Duration: {:?}", summary.duration);
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framereel", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{
        AssembleArgs, Cli, Commands, GlobalOptions, assemble_options, describe_gaps, parse_codec,
        parse_filter,
    };
    use framereel::{DEFAULT_OUTPUT, ResizeFilter, VideoCodec};

    #[test]
    fn parse_codec_aliases() {
        assert_eq!(parse_codec("h264"), Some(VideoCodec::H264));
        assert_eq!(parse_codec("HEVC"), Some(VideoCodec::H265));
        assert_eq!(parse_codec("mp4v"), Some(VideoCodec::Mpeg4));
        assert_eq!(parse_codec("vp9"), None);
    }

    #[test]
    fn parse_filter_aliases() {
        assert_eq!(parse_filter("Lanczos"), Some(ResizeFilter::Lanczos3));
        assert_eq!(parse_filter("bilinear"), Some(ResizeFilter::Triangle));
        assert_eq!(parse_filter("nearest"), Some(ResizeFilter::Nearest));
        assert_eq!(parse_filter("box"), None);
    }

    #[test]
    fn no_subcommand_means_default_assemble() {
        let cli = Cli::parse_from(["framereel"]);
        assert!(cli.command.is_none());

        let defaults = AssembleArgs::default();
        assert_eq!((defaults.width, defaults.height, defaults.fps), (2000, 2000, 25));
        assert_eq!(defaults.ext, "png");
        assert_eq!(DEFAULT_OUTPUT, "video.mp4");
    }

    #[test]
    fn assemble_flags_match_defaults() {
        let cli = Cli::parse_from(["framereel", "assemble"]);
        let Some(Commands::Assemble(args)) = cli.command else {
            panic!("expected assemble subcommand");
        };
        let defaults = AssembleArgs::default();
        assert_eq!(args.directory, defaults.directory);
        assert_eq!(args.width, defaults.width);
        assert_eq!(args.height, defaults.height);
        assert_eq!(args.fps, defaults.fps);
        assert_eq!(args.codec, defaults.codec);
        assert_eq!(args.filter, defaults.filter);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["framereel", "assemble", "frames", "--no-clobber", "--fps", "12"]);
        assert!(cli.global.no_clobber);
        let Some(Commands::Assemble(args)) = cli.command else {
            panic!("expected assemble subcommand");
        };
        assert_eq!(args.fps, 12);
        assert_eq!(args.directory.to_str(), Some("frames"));
    }

    #[test]
    fn default_run_replaces_existing_output() {
        let cli = Cli::parse_from(["framereel"]);
        assert!(!cli.global.no_clobber);

        let options = assemble_options(&AssembleArgs::default(), &GlobalOptions::default())
            .expect("default options");
        assert!(options.overwrite);
    }

    #[test]
    fn no_clobber_disables_overwrite() {
        let global = GlobalOptions {
            no_clobber: true,
            ..GlobalOptions::default()
        };
        let options = assemble_options(&AssembleArgs::default(), &global).expect("options");
        assert!(!options.overwrite);
    }

    #[test]
    fn gap_listing_is_compact() {
        assert_eq!(describe_gaps(&[3..=3, 7..=9]), "3, 7-9");
        assert_eq!(describe_gaps(&[1..=u64::MAX - 1]), format!("1-{}", u64::MAX - 1));

        let many: Vec<_> = (0..8u64).map(|n| n * 10..=n * 10).collect();
        assert_eq!(describe_gaps(&many), "0, 10, 20, 30, 40, ... (3 more)");
    }
}
