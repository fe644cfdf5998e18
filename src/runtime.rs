use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use log::{info, warn};

use crate::analysis::{AnalysisLocale, AnalysisService, AnalysisState};
use crate::channel::Channel;
use crate::sample::Sample;
use crate::session::{IngestionSession, SessionState};
use crate::transport::{CancelToken, ReadOutcome, Transport};

struct ReaderLink {
    cancel: CancelToken,
    // The reader hands the transport back on cancellation so `disconnect`
    // can close it only after the loop has fully unwound. On error or
    // end-of-stream the reader closes it itself and returns None.
    thread: JoinHandle<Option<Box<dyn Transport>>>,
}

/// Owns one ingestion session and its reader thread.
///
/// The reader thread is the session's single writer; every consumer-facing
/// method here takes a lock only long enough to copy a snapshot out, so
/// readers never observe a partially appended sample.
pub struct SessionHandle {
    session: Arc<Mutex<IngestionSession>>,
    link: Option<ReaderLink>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            session: Arc::new(Mutex::new(IngestionSession::new())),
            link: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, IngestionSession> {
        match self.session.lock() {
            Ok(guard) => guard,
            // The reader thread never panics while holding the lock, but a
            // poisoned session is still preferable to taking the process down.
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Starts a session over `transport`: epoch reset, reader thread
    /// spawned. Any previous link is torn down first.
    pub fn connect(&mut self, transport: Box<dyn Transport>) {
        self.disconnect();
        let cancel = transport.cancel_token();
        self.lock().connect();
        let session = Arc::clone(&self.session);
        let reader_cancel = cancel.clone();
        let thread = thread::spawn(move || run_reader(session, transport, reader_cancel));
        self.link = Some(ReaderLink { cancel, thread });
        info!("reader started");
    }

    /// Tears the link down in strict order: signal cancellation, join the
    /// reader so the read sequence has drained, then close the transport.
    /// Teardown errors (including a reader that already released the
    /// transport) are expected and swallowed.
    pub fn disconnect(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        link.cancel.cancel();
        match link.thread.join() {
            Ok(Some(mut transport)) => {
                if let Err(e) = transport.close() {
                    warn!("transport close during teardown: {e}");
                }
            }
            Ok(None) => {}
            Err(_) => warn!("reader thread panicked during teardown"),
        }
        self.lock().disconnect();
        info!("reader stopped");
    }

    pub fn pause(&self) {
        self.lock().pause();
    }

    pub fn resume(&self) {
        self.lock().resume();
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn rename_channel(&self, key: &str, display_name: &str) -> bool {
        self.lock().rename_channel(key, display_name)
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.lock().registry().channels().to_vec()
    }

    pub fn window(&self, n: usize) -> Vec<Sample> {
        self.lock().window(n)
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.lock().samples()
    }

    pub fn sample_count(&self) -> usize {
        self.lock().sample_count()
    }

    pub fn export_csv(&self) -> String {
        let session = self.lock();
        crate::export::render_csv(&session.samples(), session.registry())
    }

    pub fn request_analysis(
        &self,
        service: &dyn AnalysisService,
        note: impl Into<String>,
        locale: AnalysisLocale,
    ) {
        self.lock().request_analysis(service, note, locale);
    }

    pub fn analysis(&self) -> AnalysisState {
        self.lock().analysis().clone()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// One continuous read sequence per connection session. Chunks feed the
/// session in arrival order; there is no other writer, so samples land in
/// the store exactly in emission order.
fn run_reader(
    session: Arc<Mutex<IngestionSession>>,
    mut transport: Box<dyn Transport>,
    cancel: CancelToken,
) -> Option<Box<dyn Transport>> {
    fn lock(session: &Arc<Mutex<IngestionSession>>) -> MutexGuard<'_, IngestionSession> {
        match session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
    loop {
        if cancel.is_cancelled() {
            return Some(transport);
        }
        match transport.read_chunk() {
            Ok(ReadOutcome::Chunk(chunk)) => lock(&session).feed_chunk(&chunk),
            Ok(ReadOutcome::Idle) => {}
            Ok(ReadOutcome::Eos) => {
                info!("transport reached end of stream");
                lock(&session).disconnect();
                if let Err(e) = transport.close() {
                    warn!("transport close after end of stream: {e}");
                }
                return None;
            }
            Err(e) => {
                warn!("transport read failed: {e}");
                lock(&session).mark_error();
                if let Err(close_err) = transport.close() {
                    warn!("transport close after read failure: {close_err}");
                }
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ScriptedTransport;
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn reader_feeds_chunks_in_arrival_order() {
        let transport = ScriptedTransport::from_text(["1,2\n3,", "4\n"], true);
        let mut handle = SessionHandle::new();
        handle.connect(Box::new(transport));
        assert!(wait_until(Duration::from_secs(2), || handle.sample_count() == 2));
        let samples = handle.samples();
        assert_eq!(samples[0].values, vec![1.0, 2.0]);
        assert_eq!(samples[1].values, vec![3.0, 4.0]);
        handle.disconnect();
        assert_eq!(handle.state(), SessionState::Idle);
    }

    #[test]
    fn disconnect_cancels_drains_then_closes() {
        let transport = ScriptedTransport::from_text(["5\n"], true);
        let closed = transport.closed_flag();
        let mut handle = SessionHandle::new();
        handle.connect(Box::new(transport));
        assert!(wait_until(Duration::from_secs(2), || handle.sample_count() == 1));
        assert!(!closed.load(Ordering::SeqCst));
        handle.disconnect();
        // Close happens only after the reader has unwound.
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(handle.state(), SessionState::Idle);
    }

    #[test]
    fn end_of_stream_returns_to_idle_and_closes() {
        let transport = ScriptedTransport::from_text(["7\n"], false);
        let closed = transport.closed_flag();
        let mut handle = SessionHandle::new();
        handle.connect(Box::new(transport));
        assert!(wait_until(Duration::from_secs(2), || {
            closed.load(Ordering::SeqCst) && handle.state() == SessionState::Idle
        }));
        assert_eq!(handle.sample_count(), 1);
        handle.disconnect();
    }

    #[test]
    fn read_failure_surfaces_as_transient_error_state() {
        struct FailingTransport {
            cancel: CancelToken,
        }
        impl Transport for FailingTransport {
            fn read_chunk(&mut self) -> Result<ReadOutcome, crate::error::TransportError> {
                Err(crate::error::TransportError::Read(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "device unplugged",
                )))
            }
            fn cancel_token(&self) -> CancelToken {
                self.cancel.clone()
            }
            fn close(&mut self) -> Result<(), crate::error::TransportError> {
                Ok(())
            }
        }
        let mut handle = SessionHandle::new();
        handle.connect(Box::new(FailingTransport {
            cancel: CancelToken::new(),
        }));
        assert!(wait_until(Duration::from_secs(2), || {
            handle.state() == SessionState::Error
        }));
        handle.disconnect();
    }

    #[test]
    fn pause_resume_through_the_handle() {
        let transport = ScriptedTransport::from_text(["1\n"], true);
        let mut handle = SessionHandle::new();
        handle.connect(Box::new(transport));
        assert!(wait_until(Duration::from_secs(2), || handle.sample_count() == 1));
        handle.pause();
        assert_eq!(handle.state(), SessionState::Paused);
        handle.resume();
        assert_eq!(handle.state(), SessionState::Active);
        handle.disconnect();
    }
}
