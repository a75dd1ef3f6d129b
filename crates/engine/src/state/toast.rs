use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Identifies one scheduled dismissal. A ticket from a replaced toast never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DismissalTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct ScheduledDismissal {
    ticket: DismissalTicket,
    remaining: Duration,
}

/// At most one visible message with at most one pending dismissal.
#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    message: Option<String>,
    pending: Option<ScheduledDismissal>,
    #[serde(skip)]
    next_ticket: u64,
    #[serde(skip)]
    duration: Duration,
}

impl Default for Toast {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl Toast {
    pub fn new(duration: Duration) -> Self {
        Self {
            message: None,
            pending: None,
            next_ticket: 0,
            duration,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.pending.map(|pending| pending.remaining)
    }

    pub fn pending_ticket(&self) -> Option<DismissalTicket> {
        self.pending.map(|pending| pending.ticket)
    }

    /// Replaces the message and reschedules; the previous dismissal is cancelled.
    pub fn show(&mut self, message: impl Into<String>) -> DismissalTicket {
        let ticket = DismissalTicket(self.next_ticket);
        self.next_ticket += 1;
        self.message = Some(message.into());
        self.pending = Some(ScheduledDismissal {
            ticket,
            remaining: self.duration,
        });
        ticket
    }

    /// Returns true when the timer fired during this step.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        pending.remaining = pending.remaining.saturating_sub(dt);
        if pending.remaining.is_zero() {
            let ticket = pending.ticket;
            self.dismiss(ticket)
        } else {
            false
        }
    }

    /// Clears the message only if `ticket` is still the pending one.
    pub fn dismiss(&mut self, ticket: DismissalTicket) -> bool {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                self.message = None;
                true
            }
            _ => false,
        }
    }
}
