pub mod notification;
pub mod prayer;
pub mod recurrence;
pub mod settings;
pub mod subscription;
