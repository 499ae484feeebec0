// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "settings/mod.rs"]
pub mod settings;

#[path = "automod/automod_service.rs"]
pub mod automod;

#[path = "greetings/greetings_service.rs"]
pub mod greetings;

#[path = "logging/mod.rs"]
pub mod logging;
