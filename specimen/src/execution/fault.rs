// Faults
// Error values returned by test functions, and capture of panics raised inside them

use eyre::Report;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// Early exit of a test function. Any error converts into a `Fault`
/// through `?`; [`ExecutionContext::abort`](super::ExecutionContext::abort)
/// produces the abort signal.
pub struct Fault {
    kind: FaultKind,
}

enum FaultKind {
    Abort,
    Error {
        report: Report,
        backtrace: Backtrace,
    },
}

impl Fault {
    pub(crate) fn abort() -> Self {
        Self {
            kind: FaultKind::Abort,
        }
    }

    /// A fault carrying a plain message
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::report(eyre::eyre!("{}", message))
    }

    /// Wrap an existing report, for test functions built on `eyre::Result`
    pub fn report(report: Report) -> Self {
        Self {
            kind: FaultKind::Error {
                report,
                backtrace: Backtrace::force_capture(),
            },
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self.kind, FaultKind::Abort)
    }

    /// `error: <message>` with the cause chain and call stack
    pub(crate) fn describe(&self) -> String {
        match &self.kind {
            FaultKind::Abort => "abort".to_string(),
            FaultKind::Error { report, backtrace } => {
                let mut text = format!("error: {}", report);
                for cause in report.chain().skip(1) {
                    text.push_str(&format!("\n>   caused by: {}", cause));
                }
                push_stack(&mut text, backtrace);
                text
            }
        }
    }
}

impl<E> From<E> for Fault
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::report(Report::new(error))
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FaultKind::Abort => write!(f, "Fault::Abort"),
            FaultKind::Error { report, .. } => write!(f, "Fault::Error({})", report),
        }
    }
}

/// Indented stack lines, blank lines dropped
fn push_stack(text: &mut String, backtrace: &Backtrace) {
    let rendered = backtrace.to_string();
    for line in rendered.lines().filter(|line| !line.trim().is_empty()) {
        text.push_str("\n>   ");
        text.push_str(line.trim_end());
    }
}

/// A panic caught while running a tile
pub(crate) struct PanicReport {
    message: String,
    location: Option<String>,
    backtrace: Option<Backtrace>,
}

impl PanicReport {
    /// `panic: <message> at <file:line:col>` with the call stack
    pub(crate) fn describe(&self) -> String {
        let mut text = format!("panic: {}", self.message);
        if let Some(location) = &self.location {
            text.push_str(&format!(" at {}", location));
        }
        if let Some(backtrace) = &self.backtrace {
            push_stack(&mut text, backtrace);
        }
        text
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static CAPTURED: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Chain a panic hook that records panics raised while a tile runs on this
/// thread. Other panics go to the previous hook.
fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let report = PanicReport {
                    message: payload_message(info.payload()),
                    location: info.location().map(ToString::to_string),
                    backtrace: Some(Backtrace::force_capture()),
                };
                CAPTURED.with(|slot| *slot.borrow_mut() = Some(report));
            } else {
                previous(info);
            }
        }));
    });
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Run `f`, turning a panic into a [`PanicReport`]
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, PanicReport> {
    install_hook();
    let was_capturing = CAPTURING.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|flag| flag.set(was_capturing));

    result.map_err(|payload| {
        CAPTURED
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| PanicReport {
                message: payload_message(payload.as_ref()),
                location: None,
                backtrace: None,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("enclosure is open")]
    struct Outer {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_error_converts_with_source_chain() {
        fn check() -> Result<(), Fault> {
            Err(Outer {
                source: io::Error::new(io::ErrorKind::Other, "gate latch broken"),
            })?;
            Ok(())
        }

        let fault = check().unwrap_err();
        assert!(!fault.is_abort());
        let text = fault.describe();
        assert!(text.starts_with("error: enclosure is open\n>   caused by: gate latch broken"));
    }

    #[test]
    fn test_message_fault() {
        let fault = Fault::msg("no cat found");
        assert!(fault.describe().starts_with("error: no cat found"));
        assert_eq!(format!("{:?}", fault), "Fault::Error(no cat found)");
    }

    #[test]
    fn test_wrapped_report_lists_causes() {
        use eyre::WrapErr;

        let result: eyre::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "no keeper"))
            .wrap_err("feeding failed");
        let fault = Fault::report(result.unwrap_err());
        assert!(fault
            .describe()
            .starts_with("error: feeding failed\n>   caused by: no keeper"));
    }

    #[test]
    fn test_abort_fault() {
        assert!(Fault::abort().is_abort());
    }

    #[test]
    fn test_catch_panic_records_message_and_location() {
        let report = catch_panic(|| -> u8 { panic!("the {} escaped", "lion") }).err().unwrap();
        let text = report.describe();
        assert!(text.starts_with("panic: the lion escaped at "), "{text}");
        assert!(text.contains("fault.rs"), "{text}");
    }

    #[test]
    fn test_catch_panic_passes_values_through() {
        assert_eq!(catch_panic(|| 7).ok(), Some(7));
    }

    #[test]
    fn test_nested_capture_restores_flag() {
        let outer = catch_panic(|| {
            let inner = catch_panic(|| panic!("inner"));
            assert!(inner.is_err());
            panic!("outer")
        });
        let text = outer.err().map(|report| report.describe()).unwrap_or_default();
        assert!(text.starts_with("panic: outer at "), "{text}");
    }
}
