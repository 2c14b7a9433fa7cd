use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the default report directory: `<exe_dir>/reports/`
pub fn get_reports_dir() -> PathBuf {
    get_exe_dir().join("reports")
}

/// Returns the bundled tesseract directory: `<exe_dir>/tesseract/`
pub fn get_tesseract_dir() -> PathBuf {
    get_exe_dir().join("tesseract")
}

/// Returns the default config path: `<exe_dir>/config.json`
pub fn get_default_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Ensures the log directory and `output_dir` exist. Call at startup.
pub fn ensure_directories(output_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(output_dir)?;
    Ok(())
}
