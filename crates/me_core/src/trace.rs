use crate::prelude::*;

pub const LOG_ENV: &str = "ME_MARKER_LOG";
pub const LOG_FILE_NAME: &str = "me_marker.log";

/// installs a global tracing subscriber which writes into `me_marker.log` inside `data_dir`.
///
/// The filter is read from `ME_MARKER_LOG` and falls back to `info`.
/// Keep the returned guard alive until exit, otherwise buffered log lines are lost.
pub fn install_tracing(data_dir: &Dir) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};
    let filter_layer = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("info"))
        .into_diagnostic()
        .wrap_err("failed to create log filter")?;
    // create log file in the data dir. This will also serve as a check that the directory is "writeable" by us
    let writer = std::io::BufWriter::new(
        data_dir
            .create(LOG_FILE_NAME)
            .into_diagnostic()
            .wrap_err("failed to create log file")?,
    );
    let (nb, guard) = tracing_appender::non_blocking(writer);
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(nb);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("failed to install global tracing subscriber")?;
    Ok(guard)
}

/// routes miette reports and panics into the log file, so that crashes can be debugged after the fact.
pub fn install_miette_panic_hooks() -> Result<()> {
    miette::set_hook(Box::new(|_diagnostic| {
        Box::new(miette::NarratableReportHandler::new())
    }))
    .wrap_err("failed to install miette hook")?;

    #[derive(Debug, thiserror::Error, miette::Diagnostic)]
    #[error("{0}")]
    #[diagnostic(help("set the `RUST_BACKTRACE=1` environment variable to display a backtrace."))]
    struct Panic(String);

    std::panic::set_hook(Box::new(|panic_info| {
        let mut message = "Something went wrong".to_string();
        let payload = panic_info.payload();
        if let Some(msg) = payload.downcast_ref::<&str>() {
            message = msg.to_string();
        }
        if let Some(msg) = payload.downcast_ref::<String>() {
            message = msg.clone();
        }
        if let Some(location) = panic_info.location() {
            message = format!("{message} at {location}");
        }
        let report: miette::Report = Panic(message).into();
        error!("panic: {report:?}");
        eprintln!("{report:?}");
    }));
    Ok(())
}
