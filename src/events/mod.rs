use chrono::NaiveDate;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Things that happened after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MeterRegistered {
        user_id: i32,
        region: String,
        district: String,
    },
    PowerValueRecorded {
        user_id: i32,
        power_value: f64,
        window_len: usize,
        date_logged: NaiveDate,
    },
    AnomalyFlagged {
        user_id: i32,
        date_predicted: NaiveDate,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MeterRegistered { .. } => "meter_registered",
            Event::PowerValueRecorded { .. } => "power_value_recorded",
            Event::AnomalyFlagged { .. } => "anomaly_flagged",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving end of a bounded channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends without failing the caller; a closed channel is only logged.
    pub async fn send_or_log(&self, event: Event) {
        let kind = event.kind();
        if let Err(err) = self.send(event).await {
            warn!(event = kind, error = %err, "dropping event");
        }
    }
}

/// Drains the event channel until every sender is gone.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");

    while let Some(event) = receiver.recv().await {
        counter!("meterwatch_events_total", 1, "kind" => event.kind());
        match &event {
            Event::MeterRegistered {
                user_id,
                region,
                district,
            } => info!(user_id, %region, %district, "meter registered"),
            Event::PowerValueRecorded {
                user_id,
                power_value,
                window_len,
                date_logged,
            } => info!(
                user_id,
                power_value,
                window_len,
                %date_logged,
                "power value recorded"
            ),
            Event::AnomalyFlagged {
                user_id,
                date_predicted,
            } => warn!(user_id, %date_predicted, "anomaly flagged"),
        }
    }

    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_in_order() {
        let (sender, mut rx) = EventSender::channel(4);
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        sender
            .send(Event::AnomalyFlagged {
                user_id: 3,
                date_predicted: date,
            })
            .await
            .unwrap();
        sender
            .send(Event::MeterRegistered {
                user_id: 4,
                region: "North".into(),
                district: "Harbor".into(),
            })
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().kind(), "anomaly_flagged");
        assert_eq!(rx.recv().await.unwrap().kind(), "meter_registered");
    }

    #[tokio::test]
    async fn send_or_log_tolerates_closed_channel() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);
        assert!(sender
            .send(Event::AnomalyFlagged {
                user_id: 1,
                date_predicted: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            })
            .await
            .is_err());
        sender
            .send_or_log(Event::AnomalyFlagged {
                user_id: 1,
                date_predicted: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            })
            .await;
    }

    #[tokio::test]
    async fn processor_exits_when_senders_drop() {
        let (sender, rx) = EventSender::channel(2);
        let handle = tokio::spawn(process_events(rx));
        sender
            .send(Event::PowerValueRecorded {
                user_id: 9,
                power_value: 12.5,
                window_len: 1,
                date_logged: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            })
            .await
            .unwrap();
        drop(sender);
        handle.await.unwrap();
    }
}
