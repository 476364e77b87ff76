//! Application startup: arguments, configuration, logging, then one scan

use crate::app::cli::Args;
use crate::app::output::resolve_output_path;
use crate::app::report::ConsoleReporter;
use crate::app::spinner::{run_spinner, should_show_spinner};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::{ShutdownCoordinator, FORCED_EXIT_CODE};
use crate::core::version::long_version;
use crate::notifications::api::{spawn_observer, EventFilter};
use crate::scanner::template::CommandTemplate;
use crate::scanner::{ScanError, ScanResult, ScanSupervisor, SupervisorOptions};
use crate::settings::{
    ConfigProvider, LayeredSettings, TomlSettings, CANCEL_GRACE_KEY, COLOR_KEY,
    DEFAULT_SCANNED_SUFFIX, DEFAULT_SCANNER_DEVICE, DEFAULT_SCAN_COMMAND, LOG_FILE_KEY,
    LOG_FORMAT_KEY, LOG_LEVEL_KEY, SCANNED_SUFFIX_KEY, SCANNER_DEVICE_KEY, SCANNER_KEY_HELP,
    SCAN_COMMAND_KEY, SCAN_TIMEOUT_KEY,
};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub const EXIT_COMPLETE: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_CANCELLED: i32 = FORCED_EXIT_CODE;

/// How long to wait for the console and spinner tasks to drain
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Process exit code for a scan result
pub fn exit_code(result: ScanResult) -> i32 {
    match result {
        ScanResult::Complete => EXIT_COMPLETE,
        ScanResult::Cancelled => EXIT_CANCELLED,
        ScanResult::Failed | ScanResult::NotStarted => EXIT_FAILED,
    }
}

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_COMPLETE };
            let _ = e.print();
            return code;
        }
    };

    if args.version {
        println!("vaultscan {}", long_version());
        return EXIT_COMPLETE;
    }

    let file_settings = match TomlSettings::discover(args.config_file.clone()).await {
        Ok(settings) => settings,
        Err(e) => {
            // Logging from the command line alone so the failure is reported
            setup_logging(&args.overrides());
            log_error_with_context(&e, "Loading configuration");
            return EXIT_USAGE;
        }
    };
    let config_source = file_settings.source().map(Path::to_path_buf);
    let settings = LayeredSettings::new(args.overrides(), Arc::new(file_settings));
    let use_color = setup_logging(&settings);

    log::debug!("vaultscan {} starting", long_version());
    if let Some(source) = &config_source {
        log::debug!("Configuration file: {}", source.display());
    }

    if args.show_config {
        print_config(&settings, config_source.as_deref(), use_color);
        return EXIT_COMPLETE;
    }

    let options = match SupervisorOptions::from_provider(&settings) {
        Ok(options) => options,
        Err(e) => {
            log_error_with_context(&e, "Reading scanner settings");
            return EXIT_USAGE;
        }
    };

    let template = CommandTemplate::new(settings.get_or(SCAN_COMMAND_KEY, DEFAULT_SCAN_COMMAND));
    if let Err(e) = template.validate() {
        log_error_with_context(&e, "Checking scan command");
        return EXIT_USAGE;
    }

    let output = resolve_output_path(args.output.as_deref(), &settings);
    let config: Arc<dyn ConfigProvider> = Arc::new(settings);

    let outcome = ShutdownCoordinator::guard(|shutdown_rx| {
        run_scan(config, options, output, use_color, shutdown_rx)
    })
    .await;

    match outcome {
        Ok(result) => exit_code(result),
        Err(e) => {
            log_error_with_context(&e, "Running scan");
            EXIT_FAILED
        }
    }
}

/// Start the logger from settings, returning whether colour is enabled
fn setup_logging(settings: &dyn ConfigProvider) -> bool {
    let color = match settings.get_bool(COLOR_KEY) {
        Ok(Some(color)) => color,
        _ => std::io::IsTerminal::is_terminal(&std::io::stderr()),
    };
    let level = settings.get_or(LOG_LEVEL_KEY, "warn");
    let format = settings.get(LOG_FORMAT_KEY);
    let file = settings.get(LOG_FILE_KEY).filter(|file| file != "none");

    if let Err(e) = init_logging(Some(&level), format.as_deref(), file.as_deref(), color) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    color
}

fn print_config(settings: &dyn ConfigProvider, source: Option<&Path>, color: bool) {
    match source {
        Some(path) => println!("# configuration file: {}", path.display()),
        None => println!("# no configuration file; built-in defaults"),
    }

    let options = SupervisorOptions::from_provider(settings).unwrap_or_default();

    for (key, help) in SCANNER_KEY_HELP {
        let value = match settings.get(key) {
            Some(value) => value,
            None => default_display(key, &options),
        };
        let key = if color {
            key.cyan().to_string()
        } else {
            key.to_string()
        };
        println!("# {}", help);
        println!("{} = {:?}", key, value);
    }
}

pub(crate) fn default_display(key: &str, options: &SupervisorOptions) -> String {
    match key {
        SCANNER_DEVICE_KEY => DEFAULT_SCANNER_DEVICE.to_string(),
        SCAN_COMMAND_KEY => DEFAULT_SCAN_COMMAND.to_string(),
        SCANNED_SUFFIX_KEY => DEFAULT_SCANNED_SUFFIX.to_string(),
        CANCEL_GRACE_KEY => options.cancel_grace.as_millis().to_string(),
        SCAN_TIMEOUT_KEY => options
            .scan_timeout
            .map(|limit| limit.as_secs().to_string())
            .unwrap_or_else(|| "0".to_string()),
        _ => String::new(),
    }
}

async fn run_scan(
    config: Arc<dyn ConfigProvider>,
    options: SupervisorOptions,
    output: PathBuf,
    use_color: bool,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<ScanResult, ScanError> {
    let supervisor = ScanSupervisor::new(config, options)?;

    let reporter = Arc::new(ConsoleReporter::new(use_color));
    let reporter_task = spawn_observer(supervisor.subscribe("console", EventFilter::All), reporter);
    let spinner_task = should_show_spinner().then(|| {
        tokio::spawn(run_spinner(
            supervisor.subscribe("progress-spinner", EventFilter::TerminalOnly),
        ))
    });

    supervisor.scan(&output)?;

    let result = tokio::select! {
        result = supervisor.wait() => result,
        _ = shutdown_rx.recv() => {
            log::info!("Interrupt received; cancelling scan");
            supervisor.cancel().await;
            supervisor.last_result()
        }
    };

    // Closes the event channels once the session task lets go
    drop(supervisor);

    if let Some(task) = spinner_task {
        if let Ok(Ok(Err(e))) = tokio::time::timeout(DRAIN_TIMEOUT, task).await {
            log::debug!("{}", e);
        }
    }
    if tokio::time::timeout(DRAIN_TIMEOUT, reporter_task).await.is_err() {
        log::debug!("Console reporter did not finish in time");
    }

    Ok(result)
}
