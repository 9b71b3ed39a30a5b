use async_trait::async_trait;
use rust_decimal::Decimal;
use time::Date;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

pub mod sweeps;
pub mod telegram;

/// Events the booking and payment engines emit after a write commits.
#[derive(Debug, Clone)]
pub enum Notification {
    AccommodationCreated { id: Uuid, location: String },
    BookingCreated { id: Uuid },
    BookingCanceled { id: Uuid },
    BookingExpired { id: Uuid, check_out: Date },
    NoExpiredBookings,
    PaymentCompleted { booking_id: Uuid, amount: Decimal },
}

pub fn render(notification: &Notification) -> String {
    match notification {
        Notification::AccommodationCreated { id, location } => {
            format!("Accommodation created: {location} ({id})")
        }
        Notification::BookingCreated { id } => format!("New booking created: {id}"),
        Notification::BookingCanceled { id } => format!("Booking canceled: {id}"),
        Notification::BookingExpired { id, check_out } => {
            format!("Booking expired! Check-out: {check_out}, booking id: {id}")
        }
        Notification::NoExpiredBookings => "No expired bookings today!".to_string(),
        Notification::PaymentCompleted { booking_id, amount } => {
            format!("Payment of ${amount} completed for booking {booking_id}")
        }
    }
}

/// Outbound message endpoint; Telegram in production, a fake in tests.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, text: &str) -> anyhow::Result<()>;
}

/// Fire-and-forget handle the engines hold. Sending never blocks a request
/// and a delivery problem never surfaces to the HTTP caller.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    pub fn send(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            warn!(error = %e, "notification dropped");
        }
    }
}

pub fn channel(capacity: usize) -> (Notifier, mpsc::Receiver<Notification>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Notifier { tx }, rx)
}

/// Consumes the event channel and forwards rendered messages to chat.
/// Failures are logged; the queue keeps draining.
pub async fn run_dispatcher(
    mut rx: mpsc::Receiver<Notification>,
    chat: std::sync::Arc<dyn ChatClient>,
) {
    info!("notification dispatcher started");
    while let Some(notification) = rx.recv().await {
        let text = render(&notification);
        if let Err(e) = chat.send_message(&text).await {
            warn!(error = %e, "notification delivery failed");
        }
    }
    info!("notification channel closed, dispatcher stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use time::macros::date;

    #[test]
    fn renders_booking_lifecycle_messages() {
        let id = Uuid::new_v4();
        assert_eq!(
            render(&Notification::BookingCreated { id }),
            format!("New booking created: {id}")
        );
        assert_eq!(
            render(&Notification::BookingCanceled { id }),
            format!("Booking canceled: {id}")
        );
        let msg = render(&Notification::BookingExpired {
            id,
            check_out: date!(2025 - 06 - 01),
        });
        assert!(msg.contains("2025-06-01"));
        assert_eq!(
            render(&Notification::NoExpiredBookings),
            "No expired bookings today!"
        );
    }

    #[test]
    fn renders_payment_message_with_amount() {
        let booking_id = Uuid::new_v4();
        let msg = render(&Notification::PaymentCompleted {
            booking_id,
            amount: "1050.00".parse().unwrap(),
        });
        assert!(msg.contains("$1050.00"));
        assert!(msg.contains(&booking_id.to_string()));
    }

    struct RecordingChat(Mutex<Vec<String>>);

    #[async_trait]
    impl ChatClient for RecordingChat {
        async fn send_message(&self, text: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatcher_forwards_rendered_events() {
        let (notifier, rx) = channel(8);
        let chat = Arc::new(RecordingChat(Mutex::new(Vec::new())));
        let handle = tokio::spawn(run_dispatcher(rx, chat.clone()));

        let id = Uuid::new_v4();
        notifier.send(Notification::BookingCreated { id });
        drop(notifier);
        handle.await.unwrap();

        let sent = chat.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], format!("New booking created: {id}"));
    }

    #[tokio::test]
    async fn send_on_a_closed_channel_does_not_panic() {
        let (notifier, rx) = channel(1);
        drop(rx);
        notifier.send(Notification::NoExpiredBookings);
    }
}
