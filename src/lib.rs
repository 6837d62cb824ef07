/*!
# termreport - terminal reporting

**termreport** writes styled output (log lines, headings, progress bars) to
any number of `Sinks` at once: a color terminal, a plain log file, an
in-memory buffer. Every sink has a direction (standard output, error or
both), a render mode and a width, and receives each line rendered for it.

Progress bars are either drawn locally, or delegated to another `Reporter`
(another thread or process that owns the terminal) over a small message
protocol. The initiator only sends; the renderer answers a single `Ended`
notification when the bar is done.

Example

```
use termreport::{ActiveElement, Progress};
use termreport::sinks::{Direction, RenderMode, StringSink};
use termreport::Reporter;

let reporter = Reporter::default();
let sink = StringSink::new(Direction::Both, RenderMode::Plain);
reporter.add_sink(sink.clone());

reporter.info("starting <bold>build</>");
let bar = reporter.create_progress_bar();
bar.set_total(10, false);
bar.tick();
bar.end();

assert_eq!(sink.to_string(), "info starting build\n");
```

 */
#![allow(clippy::new_without_default)]

pub mod channel;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod markup;
pub mod options;
pub mod progress;
pub mod protocol;
pub mod renderer;
pub mod reporter;
pub mod sinks;
pub mod streams;
pub mod uniq_id;

#[cfg(test)]
mod tests;

pub use error::ReporterError;
pub use ledger::ActiveElement;
pub use options::{ColorChoice, ReporterOptions, TimestampFormat};
pub use progress::{Progress, ProgressHandle};
pub use protocol::{ClientMessage, ServerMessage};
pub use reporter::Reporter;
pub use sinks::{Direction, RenderMode, Sink};
pub use streams::SinkId;
pub use uniq_id::UniqID;
