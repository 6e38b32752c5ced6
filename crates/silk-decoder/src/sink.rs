use silk_types::Flow;
use silk_wire::Header;

/// Returned by a [`FlowSink`] that will not take any more flows.
///
/// The decode loop stops at the next record and reports
/// [`Completion::ConsumerClosed`](crate::Completion::ConsumerClosed).
/// This is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("flow sink closed")]
pub struct SinkClosed;

/// Destination for decoded flows.
///
/// The decode loop calls `begin` once with the parsed header, then
/// `accept` for every record in file order, then `finish` when it stops
/// without an error.
pub trait FlowSink {
    /// Called once the header is parsed and the layout resolved.
    ///
    /// # Errors
    ///
    /// Returning [`SinkClosed`] stops decoding before any record.
    fn begin(&mut self, header: &Header) -> Result<(), SinkClosed> {
        let _ = header;
        Ok(())
    }

    /// # Errors
    ///
    /// Returning [`SinkClosed`] stops decoding after this record.
    fn accept(&mut self, flow: Flow) -> Result<(), SinkClosed>;

    /// Called after the last record, or after the sink closed.
    fn finish(&mut self) {}
}

impl<S: FlowSink + ?Sized> FlowSink for &mut S {
    fn begin(&mut self, header: &Header) -> Result<(), SinkClosed> {
        (**self).begin(header)
    }

    fn accept(&mut self, flow: Flow) -> Result<(), SinkClosed> {
        (**self).accept(flow)
    }

    fn finish(&mut self) {
        (**self).finish();
    }
}

/// Eager sink: keeps every flow in memory.
#[derive(Debug, Default)]
pub struct FlowCollector {
    flows: Vec<Flow>,
}

impl FlowCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    #[must_use]
    pub fn into_flows(self) -> Vec<Flow> {
        self.flows
    }
}

impl FlowSink for FlowCollector {
    fn accept(&mut self, flow: Flow) -> Result<(), SinkClosed> {
        self.flows.push(flow);
        Ok(())
    }
}

/// Counts flows without keeping them.
#[derive(Debug, Default)]
pub struct FlowCounter {
    pub count: u64,
}

impl FlowSink for FlowCounter {
    fn accept(&mut self, _flow: Flow) -> Result<(), SinkClosed> {
        self.count += 1;
        Ok(())
    }
}

/// Passes at most `limit` flows to the inner sink, then closes.
#[derive(Debug)]
pub struct Take<S> {
    inner: S,
    remaining: u64,
}

impl<S: FlowSink> Take<S> {
    pub fn new(inner: S, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FlowSink> FlowSink for Take<S> {
    fn begin(&mut self, header: &Header) -> Result<(), SinkClosed> {
        self.inner.begin(header)
    }

    fn accept(&mut self, flow: Flow) -> Result<(), SinkClosed> {
        if self.remaining == 0 {
            return Err(SinkClosed);
        }
        self.remaining -= 1;
        self.inner.accept(flow)
    }

    fn finish(&mut self) {
        self.inner.finish();
    }
}
