use colored::Colorize;
use commands::command_argument_builder;
use phishlens::handlers::{handle_check, handle_init, handle_retrain, handle_ui};
use phishlens_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        // No subcommand provided, just show the banner
        None => return,
        Some(("ui", primary_command)) => handle_ui(primary_command),
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("check", primary_command)) => handle_check(primary_command).await,
        Some(("retrain", primary_command)) => handle_retrain(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
