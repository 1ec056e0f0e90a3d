//! EHMS core: the Acquisition Pipeline and Alert Engine, wired together by
//! [`cycle::EhmsCore`].

pub mod acquisition;
pub mod alerts;
pub mod config;
pub mod cycle;
pub mod health;
pub mod params;
pub mod ports;
pub mod thresholds;

pub use acquisition::AcquisitionPipeline;
pub use alerts::AlertEngine;
pub use config::EhmsConfig;
pub use cycle::EhmsCore;
