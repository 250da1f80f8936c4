use clap::{Parser, Subcommand};
use color_eyre::{eyre::WrapErr, Result};
use padlink::config::Config;
use padlink::controller::{Button, Controller, DPad};
use padlink::sequence::{Sequence, Step, MAX_REPEAT};
use padlink::transport::discovery::{self, PortFinder};
use padlink::transport::{ByteSink, HexDumpSink};
use serialport::SerialPort;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "padlink")]
#[command(version, about = "Drive a serial-attached gamepad emulator")]
struct Cli {
    /// Serial device path, skips port discovery
    #[arg(long, global = true)]
    port: Option<String>,

    /// Config file (default: <config dir>/padlink/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Baud rate override
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// Settle pause before each packet in milliseconds
    #[arg(long, global = true)]
    settle_ms: Option<u64>,

    /// Print packets as hex instead of writing to the serial port
    #[arg(long, global = true)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available serial ports
    Ports,

    /// Wake the console and confirm the pairing screen
    Wake,

    /// Run a TOML sequence script
    Run { script: PathBuf },

    /// Click a button
    Click {
        button: Button,
        #[arg(short = 'n', long, default_value_t = 1, value_parser = repeat_range())]
        repeat: u32,
    },

    /// Click a d-pad direction
    Dpad {
        direction: DPad,
        #[arg(short = 'n', long, default_value_t = 1, value_parser = repeat_range())]
        repeat: u32,
    },

    /// Send a single neutral packet
    Reset,
}

fn repeat_range() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(MAX_REPEAT))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup(cli.verbose)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)
        .wrap_err_with(|| format!("Failed to load config {}", config_path.display()))?;
    apply_overrides(&cli, &mut config);

    let sequence = match &cli.command {
        Command::Ports => return list_ports(),
        Command::Wake => Sequence::wake(&config.wake),
        Command::Run { script } => Sequence::load(script)?,
        Command::Click { button, repeat } => {
            Sequence::repeated(format!("click {button}"), Step::Click(*button), *repeat)?
        }
        Command::Dpad { direction, repeat } => Sequence::repeated(
            format!("d-pad {direction}"),
            Step::ClickDPad(*direction),
            *repeat,
        )?,
        Command::Reset => Sequence::new("reset", vec![Step::ReleaseAll]),
    };

    if cli.dry_run {
        info!("Dry run, packets are printed instead of sent");
        drive(HexDumpSink::new(std::io::stdout()), &config, &sequence)
    } else {
        let port = open_configured_port(&config)?;
        drive(port, &config, &sequence)
    }
}

fn setup(verbose: bool) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if verbose {
        std::env::set_var("RUST_LOG", "debug")
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(port) = &cli.port {
        config.serial.port = Some(port.clone());
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(settle_ms) = cli.settle_ms {
        config.timing.settle_interval_ms = settle_ms;
    }
}

fn list_ports() -> Result<()> {
    let ports = discovery::available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

fn open_configured_port(config: &Config) -> Result<Box<dyn SerialPort>> {
    let port = match &config.serial.port {
        Some(path) => discovery::open_port(path, config.serial.baud_rate)?,
        None => PortFinder::scan(config.serial.baud_rate)?
            .select()?
            .open()?,
    };
    Ok(port)
}

// The controller owns the sink, so the port is closed when this returns,
// whether the sequence succeeded or not.
fn drive<S: ByteSink>(sink: S, config: &Config, sequence: &Sequence) -> Result<()> {
    let mut controller = Controller::with_settle_interval(sink, config.timing.settle_interval());
    let outcome = sequence.run(&mut controller);

    // leave the receiver in the neutral state
    if sequence.steps.last() != Some(&Step::ReleaseAll) {
        if let Err(e) = controller.release_all() {
            warn!("Could not reset controller state: {}", e);
        }
    }

    outcome.wrap_err_with(|| format!("Sequence '{}' failed", sequence.name))?;
    info!("Sent {} packets", controller.packets_sent());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["padlink", "wake"])?;
        assert!(cli.port.is_none());
        assert!(cli.config.is_none());
        assert!(cli.baud.is_none());
        assert!(cli.settle_ms.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Command::Wake));
        Ok(())
    }

    #[test]
    fn test_global_flags_before_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "padlink",
            "--dry-run",
            "--port",
            "/dev/ttyACM0",
            "--baud",
            "9600",
            "--settle-ms",
            "20",
            "-v",
            "reset",
        ])?;
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(cli.baud, Some(9600));
        assert_eq!(cli.settle_ms, Some(20));
        assert!(matches!(cli.command, Command::Reset));
        Ok(())
    }

    #[test]
    fn test_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["padlink", "ports", "--config", "pad.toml", "--dry-run"])?;
        assert!(cli.dry_run);
        assert_eq!(cli.config, Some(PathBuf::from("pad.toml")));
        assert!(matches!(cli.command, Command::Ports));
        Ok(())
    }

    #[test]
    fn test_click_and_dpad() -> TestResult {
        let cli = Cli::try_parse_from(["padlink", "click", "ZL", "-n", "3"])?;
        assert!(matches!(
            cli.command,
            Command::Click {
                button: Button::ZL,
                repeat: 3
            }
        ));

        let cli = Cli::try_parse_from(["padlink", "dpad", "up_right"])?;
        assert!(matches!(
            cli.command,
            Command::Dpad {
                direction: DPad::UpRight,
                repeat: 1
            }
        ));
        Ok(())
    }

    #[test]
    fn test_run_takes_a_script_path() -> TestResult {
        let cli = Cli::try_parse_from(["padlink", "run", "scripts/wake.toml"])?;
        match cli.command {
            Command::Run { script } => assert_eq!(script, PathBuf::from("scripts/wake.toml")),
            _ => panic!("expected the run command"),
        }
        Ok(())
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["padlink"]).is_err());
        assert!(Cli::try_parse_from(["padlink", "click", "start"]).is_err());
        assert!(Cli::try_parse_from(["padlink", "dpad", "north"]).is_err());
        assert!(Cli::try_parse_from(["padlink", "click", "a", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["padlink", "click", "a", "-n", "10001"]).is_err());
        assert!(
            Cli::try_parse_from(["padlink", "click", "a", "-n", "18446744073709551615"]).is_err()
        );
        assert!(Cli::try_parse_from(["padlink", "--baud", "fast", "wake"]).is_err());
    }

    #[test]
    fn test_repeat_limit_is_accepted() -> TestResult {
        let limit = MAX_REPEAT.to_string();
        let cli = Cli::try_parse_from(["padlink", "dpad", "down", "--repeat", limit.as_str()])?;
        assert!(matches!(cli.command, Command::Dpad { repeat, .. } if repeat == MAX_REPEAT));
        Ok(())
    }

    #[test]
    fn test_overrides_replace_config_values() -> TestResult {
        let cli = Cli::try_parse_from([
            "padlink",
            "--port",
            "COM4",
            "--baud",
            "57600",
            "--settle-ms",
            "5",
            "wake",
        ])?;
        let mut config = Config::default();
        apply_overrides(&cli, &mut config);
        assert_eq!(config.serial.port.as_deref(), Some("COM4"));
        assert_eq!(config.serial.baud_rate, 57_600);
        assert_eq!(config.timing.settle_interval_ms, 5);
        assert_eq!(config.wake, Config::default().wake);
        Ok(())
    }
}
