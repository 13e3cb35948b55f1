use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// Domain events emitted by the write path. Consumers are decoupled from the
/// services that produce them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ProductCreated {
        product_id: i64,
        name: String,
    },
    TransactionRecorded {
        product_id: i64,
        transaction_type: String,
        quantity: i32,
        new_inventory: i32,
    },
    BulkImportCompleted {
        products_updated: usize,
        history_rows: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates the event channel used to wire services to the processor task.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event. Runs until all senders drop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::ProductCreated { product_id, name } => {
                info!(product_id, name = %name, "product created");
            }
            Event::TransactionRecorded {
                product_id,
                transaction_type,
                quantity,
                new_inventory,
            } => {
                info!(
                    product_id,
                    transaction_type = %transaction_type,
                    quantity,
                    new_inventory,
                    "inventory transaction recorded"
                );
            }
            Event::BulkImportCompleted {
                products_updated,
                history_rows,
            } => {
                info!(products_updated, history_rows, "bulk import completed");
            }
        }
    }
}
