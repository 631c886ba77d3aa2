use anyhow::Result;
use clap::Parser;
use ghet::commands::{self, Overrides};
use ghet::platform::{Architecture, OperatingSystem};
use std::path::PathBuf;

/// ghet - fetch binaries from GitHub releases
///
/// Picks the release asset built for this machine, verifies it against the
/// release's checksum file, unpacks it if needed and puts the binary in place.
///
/// If the GITHUB_TOKEN (or GH_TOKEN) environment variable is set, it will be
/// used for authentication.
///
/// Examples:
///   ghet download cli/cli@v2.40.0!!gh
///   ghet install knative-extensions/kn-plugin-event!!kn-event
#[derive(Parser, Debug)]
#[command(author, version = env!("GHET_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: GlobalOptions,
}

#[derive(clap::Args, Debug)]
struct GlobalOptions {
    /// Target architecture (defaults to the current one)
    #[arg(long, value_name = "ARCH", global = true)]
    arch: Option<Architecture>,

    /// Target operating system (defaults to the current one)
    #[arg(long, value_name = "OS", global = true)]
    os: Option<OperatingSystem>,

    /// Keep every matching binary instead of asking for one
    #[arg(long, global = true)]
    multiple_binaries: bool,

    /// Verify binaries inside the archive instead of the archive itself
    #[arg(long, global = true)]
    verify_in_archive: bool,

    /// Download cache directory (also via GHET_CACHE_DIR)
    #[arg(long, value_name = "PATH", global = true)]
    cache_dir: Option<PathBuf>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Do not show progress
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download a release binary into a directory (current directory by default)
    Download(TargetArgs),

    /// Install a release binary into the bin directory (also via GHET_BIN_DIR)
    Install(TargetArgs),
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// owner/repo[@tag][::archive][!!binary[.ext]]
    #[arg(value_name = "SPEC")]
    spec: String,

    /// Destination directory
    #[arg(short, long, value_name = "PATH")]
    destination: Option<PathBuf>,
}

impl GlobalOptions {
    fn overrides(&self, destination: Option<PathBuf>) -> Overrides {
        Overrides {
            arch: self.arch,
            os: self.os,
            destination,
            cache_dir: self.cache_dir.clone(),
            api_url: self.api_url.clone(),
            multiple_binaries: self.multiple_binaries,
            verify_in_archive: self.verify_in_archive,
            quiet: self.quiet,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    let runtime = ghet::runtime::RealRuntime;

    match cli.command {
        Commands::Download(args) => {
            let overrides = cli.options.overrides(args.destination);
            commands::download(runtime, &args.spec, overrides).await?
        }
        Commands::Install(args) => {
            let overrides = cli.options.overrides(args.destination);
            commands::install(runtime, &args.spec, overrides).await?
        }
    }
    Ok(())
}
