use clap::{CommandFactory, FromArgMatches};

use dialtrail::args::ProbeArgs;
use dialtrail::config::{apply_config, load_config};
use dialtrail::error::{AppError, AppResult, ValidationError};
use dialtrail::probe::run_probe;

pub(crate) fn run() -> AppResult<()> {
    let matches = ProbeArgs::command().get_matches();
    let mut args = ProbeArgs::from_arg_matches(&matches)?;

    crate::logger::init_logging(args.verbose);

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }
    if args.target.is_none() {
        tracing::error!("Missing target (set --target or provide it in config).");
        return Err(AppError::validation(ValidationError::MissingTarget));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let summary = runtime.block_on(run_probe(&args, std::io::stdout()))?;
    if summary.iterations > 0 && summary.failed == summary.iterations {
        return Err(AppError::validation(ValidationError::AllIterationsFailed {
            count: summary.iterations,
        }));
    }
    Ok(())
}
