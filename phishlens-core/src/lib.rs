pub mod analysis;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod modal;
pub mod model;
pub mod pdf;
pub mod report;
pub mod retrain;
pub mod session;
pub mod visual;

pub use error::CoreError;
pub use model::{AnalysisResult, UiPhase};
pub use session::Session;

pub fn print_banner() {
    let banner = r#"
    ╔══════════════════════════════════════════════╗
    ║   ___ _    _    _    _                       ║
    ║  | _ \ |_ (_)__| |_ | |   ___ _ _  ___       ║
    ║  |  _/ ' \| (_-< ' \| |__/ -_) ' \(_-<       ║
    ║  |_| |_||_|_/__/_||_|____\___|_||_/__/       ║
    ║                                              ║
    ║        URL phishing-risk analysis client     ║
    ╚══════════════════════════════════════════════╝
"#;
    println!("{}", banner);
}
