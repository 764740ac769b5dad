use crate::telemetry::log::LogManager;
use crate::transport::{GuidanceLink, ReconnectPolicy, TransportError};
use std::time::{Duration, Instant};

/// Lifecycle state of the guidance session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Closed,
}

/// Owns the link to the companion device for the lifetime of the loop.
///
/// The session is constructed around an already connected link (a failed
/// connect is a startup error in the caller, not a session state). Send
/// failures are reported to the caller but leave the session usable; what
/// happens to the link afterwards is governed by the [`ReconnectPolicy`].
/// `close` is idempotent and also runs from `Drop` as a last-resort guard,
/// so the channel is released on every exit path.
pub struct TransportSession<L: GuidanceLink> {
    link: L,
    state: SessionState,
    reconnect: ReconnectPolicy,
    last_failure: Option<Instant>,
    logger: LogManager,
}

impl<L: GuidanceLink> TransportSession<L> {
    pub fn new(link: L, reconnect: ReconnectPolicy) -> Self {
        Self {
            link,
            state: SessionState::Connected,
            reconnect,
            last_failure: None,
            logger: LogManager::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Attempt one message write at time `now`.
    ///
    /// Under `FixedBackoff`, a send that comes at least the backoff delay
    /// after a recorded failure re-dials the link first; within the window
    /// the existing link is tried as-is.
    pub fn send(&mut self, message: &[u8], now: Instant) -> Result<(), TransportError> {
        if self.state == SessionState::Closed {
            return Err(TransportError::Closed);
        }

        if let Some(failed_at) = self.last_failure {
            if let ReconnectPolicy::FixedBackoff { delay_secs } = self.reconnect {
                let delay = Duration::from_secs_f64(delay_secs);
                if now.saturating_duration_since(failed_at) >= delay {
                    self.logger.record("re-dialing companion link");
                    if let Err(err) = self.link.reconnect() {
                        self.last_failure = Some(now);
                        return Err(err);
                    }
                    self.last_failure = None;
                }
            }
        }

        match self.link.send(message) {
            Ok(()) => {
                self.last_failure = None;
                Ok(())
            }
            Err(err) => {
                self.last_failure = Some(now);
                Err(err)
            }
        }
    }

    /// Release the underlying channel. Safe to call more than once.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.link.close();
        self.state = SessionState::Closed;
        self.logger.record("companion link closed");
    }
}

impl<L: GuidanceLink> Drop for TransportSession<L> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct LinkLog {
        sent: Cell<usize>,
        reconnects: Cell<usize>,
        closes: Cell<usize>,
    }

    struct MockLink {
        log: Rc<LinkLog>,
        fail_sends: bool,
        fail_reconnects: bool,
    }

    impl MockLink {
        fn new(log: Rc<LinkLog>) -> Self {
            Self {
                log,
                fail_sends: false,
                fail_reconnects: false,
            }
        }
    }

    impl GuidanceLink for MockLink {
        fn send(&mut self, _message: &[u8]) -> Result<(), TransportError> {
            if self.fail_sends {
                return Err(TransportError::Send("link down".into()));
            }
            self.log.sent.set(self.log.sent.get() + 1);
            Ok(())
        }

        fn reconnect(&mut self) -> Result<(), TransportError> {
            if self.fail_reconnects {
                return Err(TransportError::Connect("peer unreachable".into()));
            }
            self.log.reconnects.set(self.log.reconnects.get() + 1);
            self.fail_sends = false;
            Ok(())
        }

        fn close(&mut self) {
            self.log.closes.set(self.log.closes.get() + 1);
        }
    }

    #[test]
    fn send_failure_leaves_session_usable() {
        let log = Rc::new(LinkLog::default());
        let mut link = MockLink::new(log.clone());
        link.fail_sends = true;
        let mut session = TransportSession::new(link, ReconnectPolicy::None);

        let now = Instant::now();
        assert!(session.send(b"Move left", now).is_err());
        assert_eq!(session.state(), SessionState::Connected);

        // None policy keeps attempting on the existing link, no re-dial.
        assert!(session.send(b"Move left", now + Duration::from_secs(5)).is_err());
        assert_eq!(log.reconnects.get(), 0);
    }

    #[test]
    fn close_is_idempotent_and_runs_once_on_drop() {
        let log = Rc::new(LinkLog::default());
        {
            let mut session =
                TransportSession::new(MockLink::new(log.clone()), ReconnectPolicy::None);
            session.close();
            session.close();
            // Drop must not close again.
        }
        assert_eq!(log.closes.get(), 1);
    }

    #[test]
    fn drop_closes_an_open_session() {
        let log = Rc::new(LinkLog::default());
        {
            let _session =
                TransportSession::new(MockLink::new(log.clone()), ReconnectPolicy::None);
        }
        assert_eq!(log.closes.get(), 1);
    }

    #[test]
    fn send_after_close_is_rejected() {
        let log = Rc::new(LinkLog::default());
        let mut session = TransportSession::new(MockLink::new(log), ReconnectPolicy::None);
        session.close();
        assert!(matches!(
            session.send(b"Move forward", Instant::now()),
            Err(TransportError::Closed)
        ));
    }

    #[test]
    fn fixed_backoff_redials_only_after_the_delay() {
        let log = Rc::new(LinkLog::default());
        let mut link = MockLink::new(log.clone());
        link.fail_sends = true;
        let mut session =
            TransportSession::new(link, ReconnectPolicy::FixedBackoff { delay_secs: 2.0 });

        let start = Instant::now();
        assert!(session.send(b"Move left", start).is_err());

        // Within the backoff window: no re-dial yet.
        assert!(session.send(b"Move left", start + Duration::from_secs(1)).is_err());
        assert_eq!(log.reconnects.get(), 0);

        // Past the window: re-dial, then the send goes through.
        assert!(session
            .send(b"Move left", start + Duration::from_secs(3))
            .is_ok());
        assert_eq!(log.reconnects.get(), 1);
        assert_eq!(log.sent.get(), 1);
    }

    #[test]
    fn failed_redial_keeps_backing_off() {
        let log = Rc::new(LinkLog::default());
        let mut link = MockLink::new(log.clone());
        link.fail_sends = true;
        link.fail_reconnects = true;
        let mut session =
            TransportSession::new(link, ReconnectPolicy::FixedBackoff { delay_secs: 2.0 });

        let start = Instant::now();
        assert!(session.send(b"Move left", start).is_err());
        assert!(matches!(
            session.send(b"Move left", start + Duration::from_secs(3)),
            Err(TransportError::Connect(_))
        ));
        assert_eq!(session.state(), SessionState::Connected);
    }
}
