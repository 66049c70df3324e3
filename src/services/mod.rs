/// Business logic services layer
pub mod contact;
pub mod detect;
pub mod health;
pub mod normalize;
pub mod request;

pub use contact::{ContactForm, ContactService};
pub use detect::DetectionService;
pub use health::HealthAggregator;
