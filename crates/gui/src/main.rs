mod app;
pub mod i18n;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state` resolves to the lib crate
// types everywhere in the binary.
pub use anatomar_gui_lib::state;

use std::path::PathBuf;

use app::AnatomApp;

/// Command-line overrides
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Replaces the landing-page model
    pub model: Option<String>,
    /// Replaces the configured assets directory
    pub assets_dir: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anatomar=info,anatomar_gui_lib=info".into()),
        )
        .init();

    let args = parse_args(std::env::args().skip(1));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("anatomar-io")
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return;
        }
    };
    let handle = runtime.handle().clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("AnatomAR")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "anatomar",
        native_options,
        Box::new(move |cc| Ok(Box::new(AnatomApp::new(cc, handle, args)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }

    // In-flight fetches and chat requests are abandoned on exit
    runtime.shutdown_background();
}

fn parse_args(mut args: impl Iterator<Item = String>) -> CliArgs {
    let mut out = CliArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => match args.next() {
                Some(path) => out.model = Some(path),
                None => tracing::warn!("--model expects a path or URL"),
            },
            "--assets" => match args.next() {
                Some(dir) => out.assets_dir = Some(PathBuf::from(dir)),
                None => tracing::warn!("--assets expects a directory"),
            },
            other => tracing::warn!("Ignoring unknown argument {other}"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> CliArgs {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_overrides() {
        let cli = args(&["--model", "models/demo.glb", "--assets", "/tmp/models"]);
        assert_eq!(cli.model.as_deref(), Some("models/demo.glb"));
        assert_eq!(cli.assets_dir, Some(PathBuf::from("/tmp/models")));
    }

    #[test]
    fn test_missing_value_is_ignored() {
        let cli = args(&["--model"]);
        assert!(cli.model.is_none());
        assert!(cli.assets_dir.is_none());
    }
}
