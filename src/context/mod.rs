pub mod briefing;
pub mod updater;

pub use briefing::{ build_briefing, build_system_prompt, NO_HEALTH_DATA };
pub use updater::update_context;
