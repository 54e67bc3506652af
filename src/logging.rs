use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::Path;

use crate::error::SearchError;

pub const LOG_BASENAME: &str = "conversation-search";

const MAX_LOG_BYTES: u64 = 10_000_000;
const KEPT_LOG_FILES: usize = 3;

/// Send search logs to files in `log_dir`. `level` is a flexi_logger spec
/// such as `"info"` or `"conversation_search_lib=debug"`; without one, debug
/// builds log at debug to file and stdout, release builds log errors only,
/// rotating at 10MB. Keep the returned handle alive for as long as logs are wanted.
pub fn init(log_dir: &Path, level: Option<&str>) -> Result<LoggerHandle, SearchError> {
    let file_spec = FileSpec::default()
        .directory(log_dir)
        .basename(LOG_BASENAME);

    let logger = if cfg!(debug_assertions) {
        Logger::try_with_env_or_str(level.unwrap_or("debug"))?
            .log_to_file(file_spec)
            .duplicate_to_stdout(Duplicate::All)
    } else {
        Logger::try_with_str(level.unwrap_or("error"))?
            .log_to_file(file_spec)
            .rotate(
                Criterion::Size(MAX_LOG_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEPT_LOG_FILES),
            )
    };

    let handle = logger.write_mode(WriteMode::BufferAndFlush).start()?;
    log::info!("Search logging to {}", log_dir.display());
    Ok(handle)
}

#[cfg(test)]
pub(crate) fn init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}
