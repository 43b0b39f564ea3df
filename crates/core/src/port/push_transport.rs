// Push Transport Port (server-initiated message stream per job)

use crate::error::Result;
use async_trait::async_trait;

/// Opens push channels scoped to one job id
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn open(&self, job_id: &str) -> Result<Box<dyn PushChannel>>;
}

/// An open push channel
///
/// Yields raw message payloads; parsing is the observer's job so that a
/// malformed message can be skipped without dropping the channel.
#[async_trait]
pub trait PushChannel: Send {
    /// Next message payload.
    ///
    /// `None` means the server ended the stream. `Some(Err(_))` is a
    /// transport-level failure.
    async fn next_message(&mut self) -> Option<Result<String>>;

    /// Release the underlying connection. Must be idempotent.
    fn close(&mut self);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// One scripted channel event
    #[derive(Debug, Clone)]
    pub enum MockFrame {
        Message(String),
        TransportError(String),
        /// Never resolves (an idle channel)
        Stall,
    }

    /// Counters shared between a transport and the channels it opened
    #[derive(Debug, Default)]
    struct Counters {
        opened: usize,
        closed: usize,
        delivered: usize,
    }

    /// Scripted push transport
    pub struct ScriptedTransport {
        frames: Vec<MockFrame>,
        counters: Arc<Mutex<Counters>>,
        fail_open: Option<String>,
    }

    impl ScriptedTransport {
        pub fn new(frames: Vec<MockFrame>) -> Self {
            Self {
                frames,
                counters: Arc::new(Mutex::new(Counters::default())),
                fail_open: None,
            }
        }

        /// Transport whose channel delivers the given JSON messages
        pub fn messages(messages: &[&str]) -> Self {
            Self::new(
                messages
                    .iter()
                    .map(|m| MockFrame::Message(m.to_string()))
                    .collect(),
            )
        }

        pub fn failing_open(message: impl Into<String>) -> Self {
            let mut transport = Self::new(Vec::new());
            transport.fail_open = Some(message.into());
            transport
        }

        pub fn open_count(&self) -> usize {
            self.counters.lock().unwrap().opened
        }

        pub fn close_count(&self) -> usize {
            self.counters.lock().unwrap().closed
        }

        /// Frames handed to the observer so far
        pub fn delivered(&self) -> usize {
            self.counters.lock().unwrap().delivered
        }
    }

    #[async_trait]
    impl PushTransport for ScriptedTransport {
        async fn open(&self, _job_id: &str) -> Result<Box<dyn PushChannel>> {
            if let Some(msg) = &self.fail_open {
                return Err(AppError::Transport(msg.clone()));
            }
            self.counters.lock().unwrap().opened += 1;
            Ok(Box::new(ScriptedChannel {
                frames: self.frames.clone().into(),
                counters: Arc::clone(&self.counters),
                closed: false,
            }))
        }
    }

    pub struct ScriptedChannel {
        frames: VecDeque<MockFrame>,
        counters: Arc<Mutex<Counters>>,
        closed: bool,
    }

    #[async_trait]
    impl PushChannel for ScriptedChannel {
        async fn next_message(&mut self) -> Option<Result<String>> {
            if self.closed {
                return None;
            }
            let frame = self.frames.pop_front()?;
            if matches!(frame, MockFrame::Stall) {
                return futures::future::pending().await;
            }
            self.counters.lock().unwrap().delivered += 1;
            match frame {
                MockFrame::Message(text) => Some(Ok(text)),
                MockFrame::TransportError(msg) => Some(Err(AppError::Transport(msg))),
                MockFrame::Stall => None,
            }
        }

        fn close(&mut self) {
            // Counts every call so tests can assert "closed exactly once"
            self.closed = true;
            self.counters.lock().unwrap().closed += 1;
        }
    }
}
