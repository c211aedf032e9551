pub mod message;
pub mod notification;
pub mod permission;
pub mod subscription;

pub use message::ClientMessage;
pub use notification::{
    ClickAction, NotificationAction, NotificationContent, NotificationData, NotificationOptions,
    NotificationPayload,
};
pub use permission::PermissionState;
pub use subscription::{BackupRecord, ClientInfo, PushSubscription, SubscriptionRecord};
