// Own test binary: the global logger can only be installed once per process.

use conversation_search_lib::logging::{self, LOG_BASENAME};
use conversation_search_lib::{Conversation, SearchEngine, SearchOptions};

#[test]
fn init_writes_search_logs_to_dir() {
    let dir = std::env::temp_dir().join(format!("conversation-search-logs-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let handle = logging::init(&dir, Some("info")).unwrap();
    log::error!("before search");
    let convs = vec![Conversation::new("c1", "Rust ownership", 0)];
    let results = SearchEngine::default().search(&convs, "rust", &SearchOptions::default());
    assert_eq!(results.len(), 1);
    handle.flush();

    let logs: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.to_string_lossy().contains(LOG_BASENAME))
        .collect();
    assert!(!logs.is_empty(), "no log file in {}", dir.display());
    let contents: String = logs
        .iter()
        .map(|p| std::fs::read_to_string(p).unwrap_or_default())
        .collect();
    assert!(contents.contains("before search"));

    std::fs::remove_dir_all(&dir).ok();
}
