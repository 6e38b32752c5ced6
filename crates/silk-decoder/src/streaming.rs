use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use silk_types::Flow;
use silk_wire::Header;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{DecoderConfig, QueueCapacity};
use crate::decoder::{DecodeSummary, SilkDecoder};
use crate::error::DecodeError;
use crate::sink::{FlowSink, SinkClosed};

/// Events delivered by a [`FlowStream`].
///
/// ```text
///   Header(Header)
///   Flow(Flow)
///   Flow(Flow)
///   ... (queue closes when decoding ends)
/// ```
#[derive(Clone, Debug)]
pub enum DecoderEvent {
    /// The header has been parsed and resolved.
    Header(Header),

    /// One decoded record.
    Flow(Flow),
}

/// Streaming decoder: flows arrive one at a time over a queue while the
/// file is still being read.
///
/// The decode loop runs on tokio's blocking pool and pushes events into
/// a bounded queue (the default, which applies backpressure) or an
/// unbounded one. Dropping the stream, or calling
/// [`close`](Self::close), makes the producer's next publish fail and
/// the loop stops with
/// [`Completion::ConsumerClosed`](crate::Completion::ConsumerClosed).
///
/// Decode errors are reported by [`next`](Self::next) after the last
/// event that was produced before the failure.
///
/// # Example
///
/// ```rust,no_run
/// use silk_decoder::{DecoderConfig, DecoderEvent, FlowStream};
///
/// # async fn run() -> Result<(), silk_decoder::DecodeError> {
/// let mut stream = FlowStream::open("flows.rw", DecoderConfig::default())?;
/// while let Some(event) = stream.next().await {
///     if let DecoderEvent::Flow(flow) = event? {
///         println!("{} -> {}", flow.src_addr, flow.dst_addr);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct FlowStream {
    events: EventReceiver,
    task: Option<JoinHandle<Result<DecodeSummary, DecodeError>>>,
    header: Option<Header>,
    summary: Option<DecodeSummary>,
}

impl FlowStream {
    /// Start decoding `reader` on the blocking pool.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<R>(reader: R, config: DecoderConfig) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        let (sender, events) = channel(config.queue);
        let task = tokio::task::spawn_blocking(move || {
            SilkDecoder::decode_into(reader, ChannelSink { sender }, &config)
        });
        Self {
            events,
            task: Some(task),
            header: None,
            summary: None,
        }
    }

    /// Open `path` and start decoding it.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, config: DecoderConfig) -> Result<Self, DecodeError> {
        let file = File::open(path)?;
        Ok(Self::spawn(BufReader::new(file), config))
    }

    /// Next event, `None` once decoding has ended and every event has been
    /// taken.
    ///
    /// A decode failure is returned once, after the events produced
    /// before it.
    pub async fn next(&mut self) -> Option<Result<DecoderEvent, DecodeError>> {
        if let Some(event) = self.events.recv().await {
            if let DecoderEvent::Header(header) = &event {
                self.header = Some(header.clone());
            }
            return Some(Ok(event));
        }

        let task = self.task.take()?;
        match task.await {
            Ok(Ok(summary)) => {
                self.summary = Some(summary);
                None
            }
            Ok(Err(err)) => Some(Err(err)),
            Err(join) => Some(Err(DecodeError::TaskFailed(join))),
        }
    }

    /// Next flow, skipping the header event.
    pub async fn next_flow(&mut self) -> Option<Result<Flow, DecodeError>> {
        loop {
            match self.next().await? {
                Ok(DecoderEvent::Flow(flow)) => return Some(Ok(flow)),
                Ok(DecoderEvent::Header(_)) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// The header, once its event has been taken.
    #[must_use]
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Summary of a decode that ran to completion, available after
    /// [`next`](Self::next) has returned `None`.
    #[must_use]
    pub fn summary(&self) -> Option<&DecodeSummary> {
        self.summary.as_ref()
    }

    /// Stop consuming and wait for the decode task to wind down.
    ///
    /// Returns the summary of the decode, or `None` if it was already
    /// collected by [`next`](Self::next) and reported as an error.
    ///
    /// # Errors
    ///
    /// The decode error, if decoding failed before it noticed the
    /// closed queue, or [`DecodeError::TaskFailed`].
    pub async fn close(self) -> Result<Option<DecodeSummary>, DecodeError> {
        let Self {
            events,
            task,
            summary,
            ..
        } = self;
        drop(events);
        match task {
            Some(task) => Ok(Some(task.await??)),
            None => Ok(summary),
        }
    }
}

fn channel(capacity: QueueCapacity) -> (EventSender, EventReceiver) {
    match capacity {
        QueueCapacity::Bounded(n) => {
            let (tx, rx) = mpsc::channel(n.max(1));
            (EventSender::Bounded(tx), EventReceiver::Bounded(rx))
        }
        QueueCapacity::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (EventSender::Unbounded(tx), EventReceiver::Unbounded(rx))
        }
    }
}

enum EventSender {
    Bounded(mpsc::Sender<DecoderEvent>),
    Unbounded(mpsc::UnboundedSender<DecoderEvent>),
}

impl EventSender {
    /// Publish from the blocking pool. Fails once the receiver is gone.
    fn publish(&self, event: DecoderEvent) -> Result<(), SinkClosed> {
        match self {
            Self::Bounded(tx) => tx.blocking_send(event).map_err(|_| SinkClosed),
            Self::Unbounded(tx) => tx.send(event).map_err(|_| SinkClosed),
        }
    }
}

enum EventReceiver {
    Bounded(mpsc::Receiver<DecoderEvent>),
    Unbounded(mpsc::UnboundedReceiver<DecoderEvent>),
}

impl EventReceiver {
    async fn recv(&mut self) -> Option<DecoderEvent> {
        match self {
            Self::Bounded(rx) => rx.recv().await,
            Self::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// Sink half of a [`FlowStream`], owned by the decode task.
struct ChannelSink {
    sender: EventSender,
}

impl FlowSink for ChannelSink {
    fn begin(&mut self, header: &Header) -> Result<(), SinkClosed> {
        self.sender.publish(DecoderEvent::Header(header.clone()))
    }

    fn accept(&mut self, flow: Flow) -> Result<(), SinkClosed> {
        self.sender.publish(DecoderEvent::Flow(flow))
    }
}
