//! Request generations
//!
//! Content requests resolve after the learner may have moved on. Each
//! request takes a [`Ticket`]; starting another request or leaving the
//! screen advances the generation, and results carrying an older ticket are
//! dropped instead of being applied to the wrong context.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default, Clone)]
pub struct RequestGenerations {
    current: u64,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request, superseding every outstanding ticket.
    pub fn begin(&mut self) -> Ticket {
        self.current = self.current.wrapping_add(1);
        Ticket(self.current)
    }

    /// Invalidates outstanding tickets without starting a new request.
    pub fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }

    /// Hands the value back only when the ticket is still current.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}
