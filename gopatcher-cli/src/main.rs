//! gopatcher CLI - Command-line interface
//!
//! Prints the path of a freshly written overlay manifest, ready for
//!
//! ```text
//! go build -overlay="$(gopatcher patches)" ./...
//! ```

mod error;
mod logging;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use gopatcher::config::DEFAULT_GO_BINARY;
use gopatcher::{pipeline, OverlayError, PatcherConfig, DEFAULT_PATCHES_DIR};

use crate::error::CliError;

/// Generate a Go build overlay from a directory of patch files.
#[derive(Debug, Parser)]
#[command(name = "gopatcher", version, about)]
struct Cli {
    /// Root of the patch tree, laid out by import path
    #[arg(default_value = DEFAULT_PATCHES_DIR)]
    patches_dir: PathBuf,

    /// Go toolchain binary used to resolve packages
    #[arg(long, value_name = "PATH", default_value = DEFAULT_GO_BINARY)]
    go: PathBuf,

    /// Resolve import paths from this directory (passed as `go -C`)
    #[arg(short = 'C', long, value_name = "DIR")]
    module_dir: Option<PathBuf>,

    /// Comma-separated build tags to resolve packages with
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    tags: Vec<String>,

    /// Create the manifest's temporary directory under DIR
    #[arg(long, value_name = "DIR")]
    tmp_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn to_config(&self) -> PatcherConfig {
        let mut config = PatcherConfig::new(&self.patches_dir)
            .with_go_binary(&self.go)
            .with_build_tags(self.tags.iter().cloned());
        if let Some(dir) = &self.module_dir {
            config = config.with_module_dir(dir);
        }
        if let Some(dir) = &self.tmp_dir {
            config = config.with_temp_parent(dir);
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf, CliError> {
    logging::init(cli.verbose)?;

    let config = cli.to_config();
    tracing::debug!(?config, "Starting overlay generation");
    Ok(pipeline::run_with_go(&config)?)
}

/// Print `err`, its causes, and a hint if anything in the chain offers one.
fn report(err: &CliError) {
    eprintln!("error: {}", err);

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }

    if let Some(hint) = find_hint(err) {
        eprintln!("hint: {}", hint);
    }
}

/// First hint offered by an [`OverlayError`] in the chain of `err`.
fn find_hint(err: &(dyn Error + 'static)) -> Option<&'static str> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(hint) = e.downcast_ref::<OverlayError>().and_then(OverlayError::hint) {
            return Some(hint);
        }
        current = e.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["gopatcher"]).unwrap();
        let config = cli.to_config();

        assert_eq!(config, PatcherConfig::default());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_all_options() {
        let cli = Cli::try_parse_from([
            "gopatcher",
            "--go",
            "/opt/go/bin/go",
            "-C",
            "/src/app",
            "--tags",
            "netgo,osusergo",
            "--tmp-dir",
            "/var/tmp",
            "-vv",
            "my-patches",
        ])
        .unwrap();
        let config = cli.to_config();

        assert_eq!(config.patches_dir, PathBuf::from("my-patches"));
        assert_eq!(config.go_binary, PathBuf::from("/opt/go/bin/go"));
        assert_eq!(config.module_dir, Some(PathBuf::from("/src/app")));
        assert_eq!(config.build_tags, vec!["netgo", "osusergo"]);
        assert_eq!(config.temp_parent, Some(PathBuf::from("/var/tmp")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_extra_positional() {
        assert!(Cli::try_parse_from(["gopatcher", "a", "b"]).is_err());
    }

    #[test]
    fn test_find_hint_through_cli_error() {
        let err: CliError = OverlayError::PackageNotFound {
            import_path: "gadgets".to_string(),
        }
        .into();

        assert!(find_hint(&err).is_some());
    }

    #[test]
    fn test_find_hint_absent() {
        let err = CliError::Logging("already set".to_string());
        assert!(find_hint(&err).is_none());

        let err: CliError = OverlayError::QueryFailed {
            program: "go".to_string(),
            status: exit_status(1),
        }
        .into();
        assert!(find_hint(&err).is_none());
    }

    #[cfg(unix)]
    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: u32) -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code)
    }
}
