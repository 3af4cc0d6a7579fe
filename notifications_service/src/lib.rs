// notifications_service/src/lib.rs

pub mod notifications;

pub use notifications::{
    EmailNotifier, NotificationDispatcher, NotificationEvent, Notifier, PushNotifier,
    SocketNotifier,
};
