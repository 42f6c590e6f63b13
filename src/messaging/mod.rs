// Messaging - Channels, notifications and render snapshots

pub mod channels;
pub mod notification;
pub mod snapshot;

pub use channels::{
    NotificationConsumer, NotificationProducer, SnapshotConsumer, SnapshotProducer,
    create_notification_channel, create_snapshot_channel,
};
pub use notification::{Notification, NotificationCategory, NotificationLevel};
pub use snapshot::{ChannelRenderSink, DeckSnapshot, InstrumentView, NullRenderSink, RenderSink};
