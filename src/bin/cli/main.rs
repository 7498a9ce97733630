//! CLI tool for inspecting comic book archives.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Comic book archive inspector
#[derive(Parser)]
#[command(name = "cbarchive")]
#[command(author, version, about = "Comic book archive inspector", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    output_format: OutputFormat,

    /// Log skipped entries and cursor movements
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List regular-file entries in archive order (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Container format (detected when omitted)
        #[arg(long, value_enum)]
        format: Option<ArchiveKind>,
    },

    /// List pages in reading order (alias: p)
    #[command(alias = "p")]
    Pages {
        /// Comic book file
        archive: PathBuf,
    },

    /// Show the pixel size of a page
    Size {
        /// Comic book file
        archive: PathBuf,

        /// Page number, starting at 1
        page: usize,
    },

    /// Render a page to an image file
    Render {
        /// Comic book file
        archive: PathBuf,

        /// Page number, starting at 1
        page: usize,

        /// Output image (format chosen from the extension)
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Clockwise rotation in degrees (0, 90, 180, 270)
        #[arg(long, default_value = "0")]
        rotate: i32,
    },

    /// Show document information (alias: i)
    #[command(alias = "i")]
    Info {
        /// Comic book file
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ArchiveKind {
    Rar,
    Zip,
    #[value(name = "7z")]
    SevenZip,
    Tar,
}

impl From<ArchiveKind> for cbarchive::ArchiveFormat {
    fn from(kind: ArchiveKind) -> Self {
        match kind {
            ArchiveKind::Rar => cbarchive::ArchiveFormat::Rar,
            ArchiveKind::Zip => cbarchive::ArchiveFormat::Zip,
            ArchiveKind::SevenZip => cbarchive::ArchiveFormat::SevenZip,
            ArchiveKind::Tar => cbarchive::ArchiveFormat::Tar,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let exit_code = match cli.command {
        Commands::List { archive, format } => {
            commands::list(&archive, format.map(Into::into), cli.output_format)
        }

        Commands::Pages { archive } => commands::pages(&archive, cli.output_format),

        Commands::Size { archive, page } => commands::size(&archive, page, cli.output_format),

        Commands::Render {
            archive,
            page,
            output,
            width,
            height,
            rotate,
        } => commands::render(&commands::RenderConfig {
            archive_path: &archive,
            page,
            output_path: &output,
            width,
            height,
            rotate,
            format: cli.output_format,
        }),

        Commands::Info { archive } => commands::info(&archive, cli.output_format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
