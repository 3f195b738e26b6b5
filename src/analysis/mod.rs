pub mod classifier;
pub mod reference;
pub mod trend;

pub use classifier::{ classify_intent, extract_topics, infer_style };
pub use trend::{ assess_significance, assess_status, assess_trend };
