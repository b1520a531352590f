//! Domain layer: value objects, entities, in-process presence state and the
//! collaborator traits the use cases depend on.

pub mod entity;
pub mod error;
pub mod event;
pub mod membership;
pub mod presence;
pub mod pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{Chat, Message, Notification, NotificationKind};
pub use error::{MessagePushError, PresenceError, StoreError, ValueObjectError};
pub use event::{OutboundEvent, RejectReason};
pub use membership::RoomMembership;
pub use presence::{Disconnection, Presence, SharedPresence};
pub use pusher::{MessagePusher, PusherChannel};
pub use registry::{Connection, ConnectionRegistry, ConnectionState, Registration};
pub use repository::ChatStore;
#[cfg(test)]
pub use repository::MockChatStore;
pub use value_object::{
    ChatId, ConnectionId, MessageContent, MessageId, NotificationId, ParticipantPair, Timestamp,
    UserId,
};
