// Enable I2C with sudo raspi-config before passing --imu.
extern crate anyhow;
extern crate chrono;
extern crate chrono_tz;
extern crate flexi_logger;
extern crate getopts;
#[macro_use]
extern crate log;
extern crate serde_json;
#[macro_use]
extern crate serde_derive;

mod battery;
mod citydata;
mod config;
mod congestion;
mod debug;
mod drawing;
mod filter;
mod motion;
mod node;
mod result;
mod structs;
mod subway;
mod weather;

use anyhow::Context;

const IMU_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(50);
// How long the battery LED stays lit after a motion event.
const LED_AWAKE: std::time::Duration = std::time::Duration::from_secs(10);

struct SeoulDash {
    config: config::Config,
    telemetry: citydata::Telemetry,
    clear_on_failure: bool,
    dump_json: bool,

    shown: structs::TelemetrySnapshot,
    shown_lines: Vec<String>,
    shared: Option<debug::SharedSnapshot>,

    imu: Option<motion::Mpu6050>,
    led: Option<battery::BatteryLed<battery::GpioLed>>,
    last_motion: Option<std::time::Instant>,
    started: std::time::Instant,
}

impl SeoulDash {
    fn new(config: config::Config) -> SeoulDash {
        return SeoulDash{
            config: config,
            telemetry: citydata::Telemetry::new(),
            clear_on_failure: false,
            dump_json: false,
            shown: structs::TelemetrySnapshot::invalid(),
            shown_lines: vec![],
            shared: None,
            imu: None,
            led: None,
            last_motion: None,
            started: std::time::Instant::now(),
        };
    }

    fn one_iteration(&mut self) -> result::SeoulDashResult<()> {
        let attempt = citydata::fetch_snapshot(&self.config);
        let outcome = self.telemetry.update(attempt);

        let snapshot = match outcome {
            Err(_) if self.clear_on_failure => structs::TelemetrySnapshot::invalid(),
            _ => self.telemetry.snapshot(),
        };
        if outcome.is_err() && self.telemetry.is_ready() && !self.clear_on_failure {
            info!("Keeping the last good snapshot on screen");
        }
        self.show(snapshot);

        if self.dump_json && outcome.is_ok() {
            match serde_json::to_string_pretty(&self.shown) {
                Ok(json) => println!("{}", json),
                Err(err) => warn!("Couldn't serialize snapshot: {}", err),
            }
        }

        return outcome;
    }

    fn show(&mut self, snapshot: structs::TelemetrySnapshot) {
        let now = chrono::Utc::now().with_timezone(&chrono_tz::Asia::Seoul);
        let lines = drawing::generate_lines(&snapshot, &now, &self.config.line_marker);

        if let Some(ref shared) = self.shared {
            match shared.lock() {
                Ok(mut latest) => *latest = snapshot.clone(),
                Err(_) => warn!("Debug snapshot lock poisoned"),
            }
        }

        if lines != self.shown_lines {
            info!("Refreshing display (valid={})", snapshot.valid);
            for line in &lines {
                println!("{}", line);
            }
            self.shown_lines = lines;
        } else {
            debug!("Display unchanged, not refreshing");
        }
        self.shown = snapshot;
    }

    fn wait_for_next_refresh(&mut self) {
        let deadline = std::time::Instant::now() + self.config.refresh_interval;

        while std::time::Instant::now() < deadline {
            let polled = match self.imu.as_mut() {
                Some(imu) => imu.poll(),
                None => {
                    // Nothing can light the LED without motion events.
                    self.tick_led();
                    std::thread::sleep(deadline.saturating_duration_since(std::time::Instant::now()));
                    return;
                },
            };

            match polled {
                Ok(motion::MotionEvent::None) => {},
                Ok(event) => self.handle_motion(event),
                Err(err) => {
                    error!("IMU read failed, disabling motion events: {}", err);
                    self.imu = None;
                },
            }
            self.tick_led();
            std::thread::sleep(IMU_POLL_INTERVAL);
        }
    }

    fn tick_led(&mut self) {
        let detected = match self.last_motion {
            Some(at) => at.elapsed() < LED_AWAKE,
            None => false,
        };
        let elapsed = self.started.elapsed();

        if let Some(led) = self.led.as_mut() {
            if let Err(err) = led.tick(detected, elapsed) {
                error!("Battery LED write failed, disabling it: {}", err);
                self.led = None;
            }
        }
    }

    fn refresh_battery(&mut self) {
        let path = match self.config.battery_voltage_path {
            Some(ref path) => path.clone(),
            None => return,
        };

        match battery::read_voltage(&path) {
            Ok(volts) => {
                let indicator = battery::BatteryIndicator::from_voltage(volts);
                info!("Battery {:.2}V ({:.0}%), pulsing at {}Hz", volts, indicator.percentage, indicator.pulse_hz);
                if let Some(led) = self.led.as_mut() {
                    led.set_indicator(indicator);
                }
            },
            Err(err) => warn!("Couldn't read battery voltage: {}", err),
        }
    }

    fn handle_motion(&mut self, event: motion::MotionEvent) {
        info!("Motion event: {:?}", event);
        self.last_motion = Some(std::time::Instant::now());
        self.refresh_battery();

        // Wake the screen.
        self.shown_lines.clear();
        let snapshot = self.shown.clone();
        self.show(snapshot);
    }
}

fn start_logger(log_dir: &str, log_level: &str) -> anyhow::Result<flexi_logger::LoggerHandle> {
    let handle = flexi_logger::Logger::try_with_env_or_str(log_level)?
        .log_to_file(flexi_logger::FileSpec::default().directory(log_dir))
        .duplicate_to_stderr(flexi_logger::Duplicate::Warn)
        .rotate(
            flexi_logger::Criterion::Size(1_000_000),
            flexi_logger::Naming::Numbers,
            flexi_logger::Cleanup::KeepLogFiles(5))
        .start()
        .with_context(|| format!("starting logger in '{}'", log_dir))?;
    return Ok(handle);
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let mut opts = getopts::Options::new();
    opts.optopt("c", "config", "JSON config file.", "FILENAME");
    opts.optflag("o", "one-shot", "fetch and display once, then exit");
    opts.optflag("j", "dump-json", "print each assembled snapshot as JSON");
    opts.optflag("x", "clear-on-failure", "show the loading screen after a failed fetch instead of the last data");
    opts.optopt("p", "debug-port", "serve a debug page on this port", "PORT");
    opts.optopt("l", "log-dir", "where to write log files", "DIR");
    opts.optopt("v", "log-level", "log spec when RUST_LOG is unset", "LEVEL");
    opts.optflag("m", "imu", "wake the display on MPU-6050 knocks and door motion");

    let matches = opts.parse(&args[1..]).context("parsing options")?;

    let log_dir = matches.opt_str("log-dir").unwrap_or("./".to_string());
    let log_level = matches.opt_str("log-level").unwrap_or("info".to_string());
    let _logger = start_logger(&log_dir, &log_level)?;

    let config_path = matches.opt_str("config").unwrap_or("seouldash.json".to_string());
    let config = config::config_from_file(&config_path)?;
    info!("Running. version={} config={:?}", env!("CARGO_PKG_VERSION"), config);

    let one_shot = matches.opt_present("one-shot");
    let mut dash = SeoulDash::new(config);
    dash.clear_on_failure = matches.opt_present("clear-on-failure");
    dash.dump_json = matches.opt_present("dump-json");

    if let Some(port) = matches.opt_str("debug-port") {
        let shared = std::sync::Arc::new(std::sync::Mutex::new(dash.shown.clone()));
        dash.shared = Some(shared.clone());
        let debug_log_dir = log_dir.clone();
        std::thread::spawn(move || {
            if let Err(err) = debug::run_debug_server(&port, &debug_log_dir, shared) {
                error!("Debug server stopped: {}", err);
            }
        });
    }

    if matches.opt_present("imu") {
        let bus = dash.config.imu_i2c_bus.unwrap_or(1);
        match motion::Mpu6050::new(bus) {
            Ok(imu) => dash.imu = Some(imu),
            Err(err) => error!("No motion sensor on i2c bus {}: {}", bus, err),
        }
    }

    if let Some(pins) = dash.config.led_gpio_pins {
        match battery::GpioLed::new(pins) {
            Ok(sink) => dash.led = Some(battery::BatteryLed::new(sink)),
            Err(err) => error!("No battery LED on gpio {:?}: {}", pins, err),
        }
    }
    dash.refresh_battery();
    dash.tick_led();

    // Placeholder until the first fetch lands.
    dash.show(structs::TelemetrySnapshot::invalid());

    loop {
        if let Err(err) = dash.one_iteration() {
            warn!("Fetch failed ({:?}): {}", err.kind(), err);
            if one_shot {
                return Err(err.into());
            }
        }

        if one_shot {
            return Ok(());
        }
        dash.wait_for_next_refresh();
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if let Err(err) = run(&args) {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
