// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    analyze_url, emit_report, init_config, load_settings, render_verdict, retrain_model,
    risk_bar, Emitted,
};
