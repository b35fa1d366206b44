use std::fs;
use std::io::{self, IsTerminal};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use tracing::info;
use tracing_subscriber::EnvFilter;

use f1can_core::mapping::{ConversionProfile, Revision};
use f1can_core::sink::{CandumpSink, FrameSink};
use f1can_core::source::{DEFAULT_PORT, UdpDatagramSource};
use f1can_core::{Dispatcher, ReplayReport, replay_capture};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("F1CAN_BUILD_COMMIT"),
    " ",
    env!("F1CAN_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "f1can")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Bridge F1 22 UDP telemetry onto a CAN bus.",
    long_about = None,
    after_help = "Examples:\n  f1can bridge --interface vcan0\n  f1can bridge --candump --revision passthrough\n  f1can replay session.pcapng --stdout --pretty\n  f1can profile show --pretty > profile.json"
)]
struct Cli {
    /// Only log warnings and errors (RUST_LOG still wins)
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Listen for game datagrams and transmit CAN frames until Ctrl-C or SIGTERM.
    Bridge {
        /// UDP port the game sends telemetry to
        #[arg(long, env = "F1CAN_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Local address to bind
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        bind: IpAddr,

        /// SocketCAN interface to transmit on
        #[arg(long, env = "F1CAN_INTERFACE", default_value = "vcan0")]
        interface: String,

        /// Print frames as candump lines on stdout instead of transmitting
        #[arg(long)]
        candump: bool,

        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Run a recorded capture through the bridge and write a JSON report.
    #[command(
        after_help = "Examples:\n  f1can replay session.pcapng -o report.json\n  f1can replay 'captures/*.pcapng' --stdout\n  f1can replay session.pcapng --candump -o report.json"
    )]
    Replay {
        /// Path to a .pcap or .pcapng file (glob patterns must match one file)
        input: PathBuf,

        /// Only replay datagrams sent to this UDP port
        #[arg(long, default_value_t = DEFAULT_PORT, conflicts_with = "any_port")]
        port: u16,

        /// Replay every UDP payload regardless of port
        #[arg(long)]
        any_port: bool,

        /// Print produced frames as candump lines on stdout
        #[arg(long, conflicts_with = "stdout")]
        candump: bool,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Conversion profile operations.
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    /// Print a built-in profile as JSON, ready to edit and pass to --profile.
    Show {
        /// Built-in revision to print
        #[arg(long, default_value = "obd2")]
        revision: Revision,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Built-in conversion table (obd2, passthrough)
    #[arg(long, default_value = "obd2", conflicts_with = "profile")]
    revision: Revision,

    /// JSON conversion profile file
    #[arg(long)]
    profile: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match cli.command {
        Commands::Bridge {
            port,
            bind,
            interface,
            candump,
            profile,
        } => cmd_bridge(SocketAddr::new(bind, port), &interface, candump, &profile, cli.quiet),
        Commands::Replay {
            input,
            port,
            any_port,
            candump,
            report,
            stdout,
            pretty,
            profile,
        } => cmd_replay(ReplayArgs {
            input,
            port: (!any_port).then_some(port),
            candump,
            report,
            stdout,
            pretty,
            profile,
            quiet: cli.quiet,
        }),
        Commands::Profile { command } => match command {
            ProfileCommands::Show { revision, pretty } => cmd_profile_show(revision, pretty),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn load_profile(args: &ProfileArgs) -> Result<ConversionProfile, CliError> {
    match &args.profile {
        Some(path) => ConversionProfile::load(path).map_err(|err| {
            CliError::new(
                format!("invalid profile {}: {}", path.display(), err),
                Some("start from `f1can profile show --pretty`".to_string()),
            )
        }),
        None => Ok(ConversionProfile::for_revision(args.revision)),
    }
}

fn cmd_bridge(
    addr: SocketAddr,
    interface: &str,
    candump: bool,
    profile: &ProfileArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let profile = load_profile(profile)?;
    let mut sink = open_sink(interface, candump)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install SIGINT/SIGTERM handler")?;

    let mut source = UdpDatagramSource::bind(addr)
        .and_then(|source| source.with_shutdown(Arc::clone(&shutdown)))
        .map_err(|err| {
            CliError::new(
                format!("cannot listen on {}: {}", addr, err),
                Some("check that no other bridge is running, or pick --port".to_string()),
            )
        })?;

    info!(%addr, interface, candump, "bridge listening, Ctrl-C or SIGTERM to stop");
    let mut dispatcher = Dispatcher::new(profile);
    dispatcher
        .run(&mut source, &mut *sink, &shutdown)
        .context("Bridge stopped")?;

    if !quiet {
        let stats = dispatcher.stats();
        eprintln!(
            "OK: {} datagrams, {} frames sent, {} dropped",
            stats.datagrams,
            stats.frames_sent,
            stats.dropped()
        );
    }
    Ok(())
}

fn open_sink(interface: &str, candump: bool) -> Result<Box<dyn FrameSink>, CliError> {
    if candump {
        return Ok(Box::new(CandumpSink::new(io::stdout(), interface)));
    }
    open_can_socket(interface)
}

#[cfg(target_os = "linux")]
fn open_can_socket(interface: &str) -> Result<Box<dyn FrameSink>, CliError> {
    let sink = f1can_core::sink::SocketCanSink::open(interface).map_err(|err| {
        CliError::new(
            format!("cannot open CAN interface '{}': {}", interface, err),
            Some(format!(
                "create it with `ip link add dev {interface} type vcan && ip link set up {interface}`, or use --candump"
            )),
        )
    })?;
    Ok(Box::new(sink))
}

#[cfg(not(target_os = "linux"))]
fn open_can_socket(interface: &str) -> Result<Box<dyn FrameSink>, CliError> {
    Err(CliError::new(
        format!("cannot open CAN interface '{}': SocketCAN needs Linux", interface),
        Some("use --candump to print frames instead".to_string()),
    ))
}

struct ReplayArgs {
    input: PathBuf,
    port: Option<u16>,
    candump: bool,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    profile: ProfileArgs,
    quiet: bool,
}

fn cmd_replay(args: ReplayArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let profile = load_profile(&args.profile)?;

    let report_path = if args.stdout {
        None
    } else {
        let path = args.report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_output(&resolved_input, &path)?;
        Some(path)
    };

    let mut dispatcher = Dispatcher::new(profile);
    let report = if args.candump {
        let mut sink = CandumpSink::new(io::stdout().lock(), "replay");
        replay_capture(&resolved_input, args.port, &mut dispatcher, &mut sink)
    } else {
        replay_capture(
            &resolved_input,
            args.port,
            &mut dispatcher,
            &mut f1can_core::sink::CollectingSink::new(),
        )
    }
    .context("Capture replay failed")?;
    let json = serialize_report(&report, args.pretty)?;

    let Some(report_path) = report_path else {
        print!("{}", json);
        return Ok(());
    };

    if let Some(parent) = report_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&report_path, json)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;

    if !args.quiet {
        eprintln!("OK: report written -> {}", report_path.display());
    }
    Ok(())
}

fn cmd_profile_show(revision: Revision, pretty: bool) -> Result<(), CliError> {
    let json = ConversionProfile::for_revision(revision)
        .to_json(pretty)
        .context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn serialize_report(report: &ReplayReport, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn ensure_distinct_output(input: &Path, report: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let report_dir = match report.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::canonicalize(parent),
        _ => fs::canonicalize("."),
    };
    // A missing output directory is created later, so it cannot be the input.
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("report path must differ from input: {}", report.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
