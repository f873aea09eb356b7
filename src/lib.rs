//! # litterman
//!
//! $$
//! \mu_{BL} = \left[(\tau\Sigma)^{-1} + P^\top\Omega^{-1}P\right]^{-1}
//! \left[(\tau\Sigma)^{-1}\pi + P^\top\Omega^{-1}q\right]
//! $$
//!
//! Expected returns for portfolio construction. Market-implied equilibrium
//! returns are blended with per-asset views predicted by regression models
//! trained on technical indicators.
//!
//! The library never installs a `tracing` subscriber; hosts bring their own.

pub mod assets;
pub mod black_litterman;
pub mod engine;
pub mod equilibrium;
pub mod error;
pub mod features;
pub mod linalg;
pub mod market;
pub mod models;
pub mod views;

pub use assets::AssetValues;
pub use black_litterman::black_litterman;
pub use black_litterman::BlackLittermanConfig;
pub use engine::ReturnEngine;
pub use engine::ReturnEngineConfig;
pub use engine::ReturnEstimate;
pub use equilibrium::equilibrium_returns;
pub use error::Error;
pub use error::Result;
pub use models::ModelKind;
pub use views::View;
pub use views::ViewGenerator;
