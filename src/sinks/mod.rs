pub mod string;
pub mod term;
pub mod writer;

pub use crate::markup::RenderMode;
pub use string::StringSink;
pub use term::TermSink;
pub use writer::WriterSink;

/// Which class of writes a sink receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Out,
    Error,
    Both,
}

impl Direction {
    pub fn receives_out(self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }

    pub fn receives_error(self) -> bool {
        matches!(self, Direction::Error | Direction::Both)
    }
}

/// A destination for rendered text.
///
/// Sinks are created by the caller and handed over to a reporter, which then
/// owns them until removal or teardown. The reporter keeps `columns` current
/// through `Reporter::update_columns`.
pub trait Sink: Send {
    fn direction(&self) -> Direction;
    fn render_mode(&self) -> RenderMode;
    fn columns(&self) -> usize;
    fn set_columns(&mut self, columns: usize);
    fn write(&mut self, text: &str) -> std::io::Result<()>;
    /// Called exactly once, when the sink leaves its registry.
    fn teardown(&mut self) {}
}
