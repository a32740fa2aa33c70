//! Emergency-contact notification.
//!
//! [`fan_out`] sends one message per recipient through a [`Transport`],
//! waits for every dispatch, and reports a single outcome.

pub mod fanout;
pub mod transport;

pub use fanout::{FanOutReport, NotifyError, fan_out};
pub use transport::{LogTransport, SmsTransport, Transport, TransportError};
