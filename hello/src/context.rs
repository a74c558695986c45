use std::time::{Duration, Instant};

/// Per-request metadata, stored in the request extensions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub start_time: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_trace_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_trace_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_uuid() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.trace_id.len(), 36);
        assert_eq!(ctx.trace_id.matches('-').count(), 4);
    }

    #[test]
    fn test_trace_ids_are_unique() {
        assert_ne!(RequestContext::new().trace_id, RequestContext::new().trace_id);
    }

    #[test]
    fn test_with_trace_id() {
        let ctx = RequestContext::with_trace_id("abc-123");
        assert_eq!(ctx.trace_id, "abc-123");
    }

    #[test]
    fn test_elapsed_increases() {
        let ctx = RequestContext::new();
        let first = ctx.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert!(ctx.elapsed() > first);
    }
}
