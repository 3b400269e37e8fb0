use std::{io::Write, path::PathBuf, time::Duration};

use clap::{CommandFactory, Parser, Subcommand};
use ledbank_app::{Command, Controller, Report, Settings, DEFAULT_CONFIG_PATH};
use ledbank_cli::{clear_screen, read_line, Input, HELP};
use ledbank_serial::{SerialTransport, DEFAULT_BAUD_RATE};

/// LED bank control utility
///
/// An interactive shell which drives the 30 channel LED bank over a serial port
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Serial port to open at start-up
    #[arg(short, long)]
    port: Option<String>,
    /// Max intensities file used by `save` and `load` without arguments
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Pause between packets of the `do` command
    #[arg(long = "interval-ms", default_value = "1000", value_name = "MS")]
    interval_ms: u64,
    /// Load max intensities from the config file at start-up
    #[arg(long)]
    load: bool,
    /// Print every sent packet
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(CliCommand::Completions { shell }) = cli.command {
        shell.generate(&mut Cli::command(), &mut std::io::stdout());
        return Ok(());
    }

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let settings = Settings {
        config_path: cli.config,
        interval: Duration::from_millis(cli.interval_ms),
    };
    let mut controller = Controller::new(SerialTransport::new(DEFAULT_BAUD_RATE), settings);
    match SerialTransport::available_ports() {
        Ok(ports) if !ports.is_empty() => log::info!("Available ports: {}", ports.join(", ")),
        Ok(_) => log::info!("No serial ports found"),
        Err(err) => log::warn!("{err}"),
    }

    if let Some(port) = cli.port {
        print_report(&controller.execute(Command::SetPort(port)));
    }
    if cli.load {
        print_report(&controller.execute(Command::Load(None)));
    }
    println!("Type `help` for the list of commands");

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();
    while let Some(line) = read_line(&mut input, &mut stdout)? {
        match Input::parse(&line) {
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Clear) => clear_screen(&mut stdout)?,
            Ok(Input::Exit) => break,
            Ok(Input::Command(command)) => print_report(&controller.execute(command)),
            Err(err) => print_report(&Report::from(err)),
        }
        stdout.flush()?;
    }

    controller.shutdown();
    log::info!("Bye");
    Ok(())
}

fn print_report(report: &Report) {
    println!("{report}");
}
