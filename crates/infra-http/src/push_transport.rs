// Server-sent events PushTransport Implementation

use crate::client::{ensure_success, ApiClient};
use crate::error::map_reqwest_error;
use crate::sse::SseDecoder;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use imhotep_core::port::{PushChannel, PushTransport};
use imhotep_core::Result;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Opens `GET /forecasts/{job_id}/stream`
pub struct SseTransport {
    client: ApiClient,
}

impl SseTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushTransport for SseTransport {
    async fn open(&self, job_id: &str) -> Result<Box<dyn PushChannel>> {
        let url = self.client.stream_endpoint(&["forecasts", job_id, "stream"])?;
        debug!(job_id = %job_id, url = %url, "Opening event stream");

        let response = self
            .client
            .stream_request(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        Ok(Box::new(SseChannel::new(
            job_id,
            response.bytes_stream().boxed(),
        )))
    }
}

/// One open event stream
///
/// Dropping the body stream releases the connection, so `close` is just
/// dropping it. Closing twice is a no-op.
pub struct SseChannel {
    job_id: String,
    body: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
    decoder: SseDecoder,
    ready: VecDeque<String>,
}

impl SseChannel {
    fn new(job_id: &str, body: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            job_id: job_id.to_string(),
            body: Some(body),
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.body.is_some()
    }
}

#[async_trait]
impl PushChannel for SseChannel {
    async fn next_message(&mut self) -> Option<Result<String>> {
        loop {
            if let Some(message) = self.ready.pop_front() {
                return Some(Ok(message));
            }

            let body = self.body.as_mut()?;
            match body.next().await {
                Some(Ok(chunk)) => match self.decoder.feed(&chunk) {
                    Ok(events) => self.ready.extend(events),
                    Err(e) => {
                        warn!(job_id = %self.job_id, error = %e, "Dropping oversized event stream");
                        self.body = None;
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => return Some(Err(map_reqwest_error(e))),
                None => {
                    if self.decoder.has_partial() {
                        warn!(job_id = %self.job_id, "Event stream ended mid-event");
                    }
                    self.body = None;
                    return None;
                }
            }
        }
    }

    fn close(&mut self) {
        if self.body.take().is_some() {
            info!(job_id = %self.job_id, "Event stream closed");
        }
    }
}
