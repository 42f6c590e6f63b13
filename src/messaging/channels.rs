// Lock-free channels between the clock thread, the control thread and the UI

use crate::messaging::notification::Notification;
use crate::messaging::snapshot::DeckSnapshot;
use ringbuf::{HeapRb, traits::Split};

pub type SnapshotProducer = ringbuf::HeapProd<DeckSnapshot>;
pub type SnapshotConsumer = ringbuf::HeapCons<DeckSnapshot>;

pub fn create_snapshot_channel(capacity: usize) -> (SnapshotProducer, SnapshotConsumer) {
    let rb = HeapRb::<DeckSnapshot>::new(capacity);
    rb.split()
}

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}
