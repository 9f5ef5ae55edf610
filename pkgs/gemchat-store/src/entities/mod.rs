//! Sea-ORM entities for gemchat-store

pub mod settings;

pub use settings::Entity as Settings;
