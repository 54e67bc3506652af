use std::fmt;

/// Errors raised at the edges of the engine: loading configuration, parsing
/// candidate data, starting logging. Searching itself never fails.
#[derive(Debug)]
pub enum SearchError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Config(String),
    Logging(flexi_logger::FlexiLoggerError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Io(e) => write!(f, "IO error: {}", e),
            SearchError::Parse(e) => write!(f, "parse error: {}", e),
            SearchError::Config(msg) => write!(f, "invalid config: {}", msg),
            SearchError::Logging(e) => write!(f, "logging error: {}", e),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Io(e) => Some(e),
            SearchError::Parse(e) => Some(e),
            SearchError::Logging(e) => Some(e),
            SearchError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for SearchError {
    fn from(e: std::io::Error) -> Self {
        SearchError::Io(e)
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        SearchError::Parse(e)
    }
}

impl From<flexi_logger::FlexiLoggerError> for SearchError {
    fn from(e: flexi_logger::FlexiLoggerError) -> Self {
        SearchError::Logging(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config() {
        let err = SearchError::Config("page_size must be positive".to_string());
        assert_eq!(err.to_string(), "invalid config: page_size must be positive");
    }

    #[test]
    fn test_invalid_log_spec() {
        let err: SearchError = flexi_logger::LogSpecification::parse("x=notalevel")
            .unwrap_err()
            .into();
        assert!(matches!(err, SearchError::Logging(_)));
        assert!(err.to_string().starts_with("logging error"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: SearchError = parse_err.into();
        assert!(matches!(err, SearchError::Parse(_)));
        assert!(err.to_string().starts_with("parse error"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
