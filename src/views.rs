//! # Views
//!
//! $$
//! (q_i, c_i) = \operatorname{View}(\text{history}_i)
//! $$
//!
//! Machine-learning generated investor views: one annualised return and one
//! confidence per asset.

pub mod generator;
pub mod trainer;
pub mod types;

pub use generator::annualize;
pub use generator::ViewGenerator;
pub use generator::ViewGeneratorConfig;
pub use trainer::clamp_confidence;
pub use trainer::train_view_model;
pub use trainer::TrainerConfig;
pub use types::TrainReport;
pub use types::View;
pub use types::ViewOutcome;
pub use types::ViewSet;
