mod config;
mod discovery;
mod gesture;
mod input;
#[cfg(target_os = "linux")]
mod interrupt;
mod motion;
mod multitouch;
mod output;
mod pointer;
mod tracker;

use clap::Parser;
use config::{Acceleration, Config, ConfigError};
use discovery::DiscoveryError;
use input::InputError;
use output::OutputError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser)]
#[command(
    name = "tappad",
    about = "Turn a touchscreen into a touchpad-style virtual pointer"
)]
struct Cli {
    /// Touch device to read (e.g. /dev/input/event26); found through udev when omitted
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Log every raw kernel event
    #[arg(short, long)]
    verbose: bool,

    /// Longest tap that still clicks, in seconds
    #[arg(long, default_value_t = 0.25)]
    click_time: f64,

    /// Longest second-finger tap that right clicks, in seconds
    #[arg(long, default_value_t = 0.2)]
    right_click_tap: f64,

    /// Window after a tap in which touching again starts a drag, in seconds
    #[arg(long, default_value_t = 0.4)]
    double_click_timeout: f64,

    /// Movement per report, in device units, below which the cursor stays put
    #[arg(long, default_value_t = 1.0)]
    move_threshold: f64,

    /// Two-finger movement per report, in device units, needed for one wheel tick
    #[arg(long, default_value_t = 8.0)]
    scroll_threshold: f64,

    /// Cursor speed scale (lower is slower)
    #[arg(long, default_value_t = 0.35)]
    move_scale: f64,

    /// X speed multiplier; negative inverts the axis
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    x_multiplier: f64,

    /// Y speed multiplier; negative inverts the axis
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    y_multiplier: f64,

    /// Exchange the X and Y axes (rotated screens)
    #[arg(long)]
    swap_axes: bool,

    /// Scroll like a mouse wheel instead of naturally
    #[arg(long)]
    traditional_scroll: bool,

    /// Constant cursor speed
    #[arg(long)]
    no_acceleration: bool,

    /// How strongly finger speed raises cursor speed
    #[arg(long, default_value_t = 0.5)]
    acceleration_factor: f64,

    /// Upper bound of the acceleration multiplier
    #[arg(long, default_value_t = 3.0)]
    acceleration_max: f64,

    /// Shortest gap between reports used for speed estimation, in seconds
    #[arg(long, default_value_t = 0.001)]
    acceleration_min_delta: f64,
}

impl Cli {
    fn config(&self) -> Result<Config, ConfigError> {
        let config = Config {
            invert_scroll: !self.traditional_scroll,
            click_time: config::seconds("click time", self.click_time)?,
            right_click_tap: config::seconds("right click tap", self.right_click_tap)?,
            double_click_timeout: config::seconds(
                "double click timeout",
                self.double_click_timeout,
            )?,
            move_threshold: self.move_threshold,
            scroll_threshold: self.scroll_threshold,
            move_scale: self.move_scale,
            x_multiplier: self.x_multiplier,
            y_multiplier: self.y_multiplier,
            swap_axes: self.swap_axes,
            acceleration: Acceleration {
                enabled: !self.no_acceleration,
                factor: self.acceleration_factor,
                max_multiplier: self.acceleration_max,
                min_time_delta: config::seconds(
                    "acceleration min delta",
                    self.acceleration_min_delta,
                )?,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Error)]
enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),
    #[cfg(not(target_os = "linux"))]
    #[error("only Linux evdev devices are supported")]
    Unsupported,
}

impl Error {
    fn hint(&self) -> Option<&'static str> {
        let denied = match self {
            Error::Input(e) => e.is_permission_denied(),
            Error::Output(e) => e.is_permission_denied(),
            _ => false,
        };
        denied.then_some(
            "run with sudo, or add your user to the 'input' group (and allow access to /dev/uinput)",
        )
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[cfg(target_os = "linux")]
fn run(cli: &Cli) -> Result<(), Error> {
    use discovery::udev_discovery::UdevDiscovery;
    use discovery::DeviceDiscovery;
    use gesture::GestureEngine;
    use input::evdev_backend::EvdevBackend;
    use input::{Grabbed, TouchSource};
    use output::uinput_sink::VirtualPointer;
    use output::CommandSink;
    use std::time::Instant;

    let config = cli.config()?;

    let device_path = match &cli.device {
        Some(path) => path.clone(),
        None => {
            let devices = UdevDiscovery::find_touchscreens()?;
            let device = devices.first().ok_or(DiscoveryError::NotFound)?;
            log::info!(
                "found touchscreen: {} ({})",
                device.devnode.display(),
                device.name.as_deref().unwrap_or("unnamed")
            );
            device.devnode.clone()
        }
    };

    let mut source = EvdevBackend::open_with_verbose(&device_path, cli.verbose)?;
    log::info!("reading {} ({})", device_path.display(), source.name());

    let mut sink = VirtualPointer::new()?;
    interrupt::install().map_err(Error::Signal)?;

    let mut grabbed = Grabbed::acquire(&mut source)?;
    let slot_count = grabbed.slot_count();
    log::info!("device grabbed, {} touch slots", slot_count);

    let mut engine = GestureEngine::new(config, slot_count, Instant::now());
    while !interrupt::interrupted() {
        let events = match grabbed.read_batch() {
            Ok(events) => events,
            Err(InputError::Interrupted) => continue,
            Err(e) => return Err(e.into()),
        };
        for event in events {
            let reports = engine.handle(event, Instant::now());
            if !reports.is_empty() {
                sink.send(&reports)?;
            }
        }
    }

    log::info!("interrupted, releasing device");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(cli: &Cli) -> Result<(), Error> {
    cli.config()?;
    Err(Error::Unsupported)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        if let Some(hint) = e.hint() {
            log::error!("{}", hint);
        }
        std::process::exit(1);
    }
}
