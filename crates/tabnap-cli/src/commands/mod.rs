//! Command implementations.

pub mod settings;

pub use self::settings::execute_settings;
