//! One-way notification channel.

use crate::domain::error::QuantsignalError;
use crate::domain::signal::TimedSignal;

pub trait NotifyPort {
    fn send(&self, message: &str) -> Result<(), QuantsignalError>;
}

pub fn format_alert(symbol: &str, signal: &TimedSignal) -> String {
    format!(
        "*{}* {} signal at {:.2} ({})",
        symbol, signal.signal, signal.close, signal.timestamp
    )
}

/// Sends an alert for an actionable signal. Delivery failures are logged and
/// swallowed; the return value only reports whether a message went out.
pub fn notify_transition(port: &dyn NotifyPort, symbol: &str, signal: &TimedSignal) -> bool {
    if !signal.signal.is_actionable() {
        return false;
    }
    match port.send(&format_alert(symbol, signal)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(%symbol, "alert not delivered: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Signal;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    struct RecordingPort {
        sent: RefCell<Vec<String>>,
        fail: bool,
    }

    impl NotifyPort for RecordingPort {
        fn send(&self, message: &str) -> Result<(), QuantsignalError> {
            if self.fail {
                return Err(QuantsignalError::Notification {
                    reason: "offline".into(),
                });
            }
            self.sent.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    fn timed(signal: Signal) -> TimedSignal {
        TimedSignal {
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            close: 187.456,
            signal,
        }
    }

    #[test]
    fn sends_only_actionable_signals() {
        let port = RecordingPort {
            sent: RefCell::new(Vec::new()),
            fail: false,
        };
        assert!(!notify_transition(&port, "AAPL", &timed(Signal::None)));
        assert!(notify_transition(&port, "AAPL", &timed(Signal::Buy)));
        assert!(notify_transition(&port, "AAPL", &timed(Signal::Sell)));

        let sent = port.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], "*AAPL* BUY signal at 187.46 (2024-05-02 00:00:00)");
    }

    #[test]
    fn failures_are_swallowed() {
        let port = RecordingPort {
            sent: RefCell::new(Vec::new()),
            fail: true,
        };
        assert!(!notify_transition(&port, "AAPL", &timed(Signal::Buy)));
    }
}
