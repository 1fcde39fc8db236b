//! Output Sink

use i2c_protocol::Token;
use std::io::{self, Write};

/// Destination for rendered tokens
pub trait TokenSink {
    /// Write one token, blocking until it is accepted
    fn emit(&mut self, token: &Token) -> io::Result<()>;

    /// Push buffered output to its destination
    fn flush_tokens(&mut self) -> io::Result<()>;
}

impl<W: Write> TokenSink for W {
    fn emit(&mut self, token: &Token) -> io::Result<()> {
        write!(self, "{}", token)
    }

    fn flush_tokens(&mut self) -> io::Result<()> {
        self.flush()
    }
}
