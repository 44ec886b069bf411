use crate::CLAP_STYLING;
use clap::{arg, command};
use phishlens_core::config::DEFAULT_CONFIG_DIR;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("phishlens")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("phishlens")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Path to config.json (default: ~/.config/phishlens/config.json)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-s --"server" <URL>)
                .required(false)
                .global(true)
                .help("Base URL of the classification service, overrides the config file"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .global(true)
                .help("Request timeout in seconds, overrides the config file")
                .value_parser(clap::value_parser!(u64)),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a default PhishLens configuration to your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to store config.json in")
                        .default_value(DEFAULT_CONFIG_DIR),
                )
                .arg(
                    arg!(-f - -"force")
                        .help("Overwrites any existing configuration without asking.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("check")
                .about("Analyzes a URL and prints its phishing-risk verdict")
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The URL to analyze (sent to the server as typed)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown, pdf")
                        .value_parser(["text", "json", "markdown", "pdf"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen, PDF goes to the configured report path)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"copy")
                        .required(false)
                        .help("Copy the plain-text report to the clipboard")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("retrain")
                .about("Asks the server to retrain its model")
                .arg(
                    arg!(-y --"yes")
                        .required(false)
                        .help("Skip the confirmation prompt")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(command!("ui").about("Launches the interactive terminal client"))
}
