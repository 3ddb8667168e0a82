use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

/// wgpu and naga are chatty at info; keep them to warnings.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

pub const LOG_FILE_ENV: &str = "RUST_LOG_FILE";
pub const DEFAULT_LOG_FILE: &str = "logs/walkthrough.log";

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Route walkthrough events to the browser console.
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            tracing_subscriber::registry()
                .with(EnvFilter::new(DEFAULT_FILTER))
                .with(wasm_layer)
                .init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use std::path::{Path, PathBuf};
        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
        use tracing_subscriber::fmt;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Where the rolling log goes: `RUST_LOG_FILE` or the default path.
        pub fn log_file_path() -> PathBuf {
            std::env::var_os(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
        }

        fn file_writer(path: &Path) -> NonBlocking {
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let prefix = path.file_name().map_or_else(|| "walkthrough.log".into(), |n| n.to_os_string());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, prefix));
            // dropping the guard would stop the writer thread
            let _ = FILE_GUARD.set(guard);
            writer
        }

        /// Stderr plus a daily-rolled file, filtered by `RUST_LOG`.
        pub fn init() {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .compact();
            let file_layer = fmt::layer()
                .with_writer(file_writer(&log_file_path()))
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .compact();

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();

            log_panics();
        }

        /// Send panics through tracing so a crash lands in the log file.
        fn log_panics() {
            std::panic::set_hook(Box::new(|info| {
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "<non-string panic>".to_string());
                let location = info.location().map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
                let backtrace = std::backtrace::Backtrace::force_capture();
                tracing::error!(location = location.as_deref().unwrap_or("unknown"), "panic: {message}\n{backtrace}");
            }));
        }

    }
}
