// Shamelessly derived from the log_err crate

pub trait TraceErrResult<T, E: std::fmt::Debug + std::fmt::Display>: Sized {
    /// `expect`s the `Result`, and outputs error message (in exact same style as `expect`) through `error!` as well.
    #[track_caller]
    fn trace_expect(self, msg: &str) -> T;

    /// Passes the `Result` through unchanged, logging any error at `debug` level with the caller location.
    #[track_caller]
    fn trace_err(self, msg: &str) -> Self;
}

impl<T, E: std::fmt::Debug + std::fmt::Display> TraceErrResult<T, E> for std::result::Result<T, E> {
    fn trace_expect(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(ref e) => {
                tracing::error!(target: "expect", "{}: {msg}: {e}", std::panic::Location::caller());
                self.expect(msg)
            }
        }
    }

    fn trace_err(self, msg: &str) -> Self {
        if let Err(e) = &self {
            tracing::debug!(target: "trace_err", "{}: {msg}: {e}", std::panic::Location::caller());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_err_passes_through() {
        let ok: Result<u32, String> = Ok(7);
        assert_eq!(ok.trace_err("unused"), Ok(7));

        let err: Result<u32, String> = Err("boom".into());
        assert_eq!(err.trace_err("lookup failed"), Err("boom".to_string()));
    }

    #[test]
    #[should_panic(expected = "lock poisoned")]
    fn trace_expect_panics_with_message() {
        let err: Result<u32, String> = Err("boom".into());
        err.trace_expect("lock poisoned");
    }
}
