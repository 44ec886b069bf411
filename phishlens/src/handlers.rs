use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use phishlens_client::{Classifier, ClassifierClient};
use phishlens_core::analysis::{self, ANALYZING_LABEL, Finished};
use phishlens_core::clipboard::ClipboardChain;
use phishlens_core::config::{DEFAULT_CONFIG_DIR, Settings};
use phishlens_core::modal::ModalKind;
use phishlens_core::report::{self, ReportContext, ReportExporter, ReportFormat};
use phishlens_core::retrain::{self, RETRAIN_FAILED, RETRAIN_WARNING, Retrained, TRAINING_LABEL};
use phishlens_core::visual::Hsl;
use phishlens_core::Session;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Logging for the one-shot commands. Goes to stderr so reports piped
/// from stdout stay clean.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

fn confirmed(response: &str) -> bool {
    response == "y" || response == "yes"
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

/// Config file values with the global `--server`/`--timeout` flags on top.
/// Globals propagate down, so pass the subcommand's matches.
pub fn load_settings(args: &ArgMatches) -> Result<Settings> {
    let path = args
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    Ok(settings.with_overrides(
        args.get_one::<String>("server").map(String::as_str),
        args.get_one::<u64>("timeout").copied(),
    ))
}

pub fn build_client(settings: &Settings) -> Result<ClassifierClient> {
    ClassifierClient::with_timeout(&settings.server_url, settings.timeout_secs)
        .with_context(|| format!("Invalid server URL '{}'", settings.server_url))
}

// ============================================================================
// init
// ============================================================================

/// Writes `settings` to `config.json` inside `dir`. An existing file is
/// only replaced when `force` is set or `confirm_overwrite` agrees.
/// Returns the written path, or `None` when the user kept the old file.
pub fn init_config(
    dir: &str,
    settings: &Settings,
    force: bool,
    confirm_overwrite: impl FnOnce(&Path) -> bool,
) -> Result<Option<PathBuf>> {
    let path = Settings::path_in(dir);
    if Settings::exists(&path) && !force && !confirm_overwrite(&path) {
        return Ok(None);
    }
    settings
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    init_logging();
    print_divider();
    println!("{}", "  PHISHLENS INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let dir = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_DIR);
    let force = args.get_flag("force");

    let settings = Settings::default().with_overrides(
        args.get_one::<String>("server").map(String::as_str),
        args.get_one::<u64>("timeout").copied(),
    );

    let written = init_config(dir, &settings, force, |path| {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Configuration already exists:");
        println!("  {} {}", "•".yellow(), path.display().to_string().bright_white());
        println!();
        let response = print_prompt("Do you want to overwrite it? [y/N]:").unwrap_or_default();
        println!();
        confirmed(&response)
    })?;

    match written {
        Some(path) => {
            println!(
                "{} Config written: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
            println!("{} Server: {}", "→".blue(), settings.server_url.bright_white());
            println!(
                "{} Timeout: {}s",
                "→".blue(),
                settings.timeout_secs.to_string().cyan()
            );
        }
        None => println!("{} Initialization cancelled.", "✗".red().bold()),
    }
    println!();
    Ok(())
}

// ============================================================================
// check
// ============================================================================

/// Runs one analysis through the same controller the interactive client
/// uses. A rejected or failed analysis becomes an error carrying the
/// notice text.
pub async fn analyze_url<C: Classifier>(classifier: &C, url: &str) -> Result<Session> {
    let mut session = Session::new();
    session.input = url.to_string();

    let finished = analysis::analyze(&mut session, classifier, url)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    match finished {
        Finished::Shown => Ok(session),
        _ => {
            let message = session
                .acknowledge_notice()
                .map(|notice| notice.text)
                .unwrap_or_else(|| analysis::ANALYSIS_FAILED.to_string());
            bail!(message)
        }
    }
}

/// Status line and confidence, tinted with the risk hue.
pub fn render_verdict(session: &Session) -> Option<String> {
    let view = session.risk_view()?;
    let result = session.result()?;
    let (r, g, b) = Hsl {
        hue: view.hue,
        saturation: 80.0,
        lightness: 45.0,
    }
    .to_rgb();
    let tint = |s: &str| -> ColoredString { s.truecolor(r, g, b).bold() };

    let mut out = String::new();
    out.push_str(&format!("{}\n", tint(view.status_label)));
    out.push_str(&format!(
        "{} {}\n",
        "URL:".bright_white().bold(),
        session.current_url()
    ));
    out.push_str(&format!(
        "{} {}  [{}]\n",
        "Confidence:".bright_white().bold(),
        tint(&view.confidence_text),
        risk_bar(view.marker_percent, 30)
    ));
    if !result.explanation.is_empty() {
        out.push_str(&format!("{}\n", "Reasons:".bright_white().bold()));
        for reason in &result.explanation {
            out.push_str(&format!("  {} {}\n", "•".cyan(), reason));
        }
    }
    Some(out)
}

/// Text rendition of the risk meter with the marker at `percent`.
pub fn risk_bar(percent: f64, width: usize) -> String {
    let width = width.max(2);
    let column = ((percent.clamp(0.0, 100.0) / 100.0) * (width - 1) as f64).round() as usize;
    (0..width)
        .map(|i| if i == column { '▼' } else { '─' })
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
pub enum Emitted {
    /// Text to print.
    Stdout(String),
    File(PathBuf),
}

/// Renders the report and decides where it goes. PDF is never printed;
/// without `--output` it lands at the configured report path.
pub fn emit_report(
    ctx: &ReportContext,
    format: ReportFormat,
    output: Option<&Path>,
    default_pdf: &Path,
) -> Result<Emitted> {
    let content = report::render_report(ctx, format, Local::now())?;
    let target = match (output, format) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, ReportFormat::Pdf) => Some(default_pdf.to_path_buf()),
        (None, _) => None,
    };

    match target {
        Some(path) => {
            report::save_report(&content, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            Ok(Emitted::File(path))
        }
        None => Ok(Emitted::Stdout(String::from_utf8_lossy(&content).into_owned())),
    }
}

pub async fn handle_check(args: &ArgMatches) -> Result<()> {
    init_logging();

    let settings = load_settings(args)?;
    let client = build_client(&settings)?;

    let url = args
        .get_one::<String>("URL")
        .ok_or_else(|| anyhow!("A URL is required"))?;
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output");

    if Url::parse(url).is_err() {
        eprintln!(
            "{} '{}' is not an absolute URL, sending it anyway",
            "ℹ".blue(),
            url
        );
    }

    let spinner = spinner(ANALYZING_LABEL);
    let analyzed = analyze_url(&client, url).await;
    spinner.finish_and_clear();

    let mut session = analyzed?;
    let ctx = session
        .report_context()
        .ok_or_else(|| anyhow!("No result to report"))?;

    // The text format is the verdict itself
    if format == ReportFormat::Text && output.is_none() {
        if let Some(verdict) = render_verdict(&session) {
            print!("{}", verdict);
        }
    } else {
        match emit_report(&ctx, format, output.map(PathBuf::as_path), &settings.report_path)? {
            Emitted::Stdout(text) => println!("{}", text),
            Emitted::File(path) => println!(
                "{} Report saved to: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
        }
    }

    if args.get_flag("copy") {
        let mut exporter = ReportExporter::new(ClipboardChain::one_shot());
        let copied = exporter.copy_to_clipboard(&mut session);
        if let Some(notice) = session.acknowledge_notice() {
            if copied {
                println!("{} {}", "✓".green().bold(), notice.text);
            } else {
                eprintln!("{} {}", "✗".red().bold(), notice.text);
            }
        }
    }

    Ok(())
}

// ============================================================================
// retrain
// ============================================================================

/// Confirm-then-retrain. Returns the server message, or `None` when the
/// confirmation was declined.
pub async fn retrain_model<C: Classifier>(
    classifier: &C,
    confirm: impl FnOnce(&str) -> bool,
) -> Result<Option<String>> {
    let mut session = Session::new();
    retrain::request(&mut session);

    if !confirm(session.modals.message(ModalKind::Confirm)) {
        session.modals.close(ModalKind::Confirm);
        return Ok(None);
    }

    let retrained = retrain::confirm_and_run(&mut session, classifier)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    match retrained {
        Some(Retrained::Completed(message)) => Ok(Some(message)),
        Some(Retrained::Failed) => bail!(RETRAIN_FAILED),
        None => Ok(None),
    }
}

pub async fn handle_retrain(args: &ArgMatches) -> Result<()> {
    init_logging();

    let settings = load_settings(args)?;
    let client = build_client(&settings)?;
    let skip_prompt = args.get_flag("yes");

    let proceed = skip_prompt || {
        println!("{} {}", "⚠".yellow().bold(), RETRAIN_WARNING.yellow());
        confirmed(&print_prompt("Continue? [y/N]:").unwrap_or_default())
    };

    let spinner = proceed.then(|| spinner(TRAINING_LABEL));
    let outcome = retrain_model(&client, |_| proceed).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome? {
        Some(message) => println!("{} {}", "✓".green().bold(), message),
        None => println!("{} Retrain cancelled.", "✗".red().bold()),
    }
    Ok(())
}

// ============================================================================
// ui
// ============================================================================

pub fn handle_ui(args: &ArgMatches) -> Result<()> {
    let settings = load_settings(args)?;
    let client = build_client(&settings)?;
    phishlens_tui::run(client, &settings)
}
