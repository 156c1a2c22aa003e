pub mod appsettings;
pub mod delivery;
pub mod email;
pub mod subscriptions;
