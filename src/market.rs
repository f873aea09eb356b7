//! # Market Data
//!
//! $$
//! \mathcal{D}: (\text{ticker}, [t_0, t_1)) \mapsto \{(t, P_t, V_t)\}
//! $$
//!
//! Price history, market capitalisation and the provider boundary.

pub mod memory;
pub mod provider;
pub mod series;
#[cfg(feature = "yahoo")]
pub mod yahoo;

pub use memory::InMemoryProvider;
pub use provider::parse_date;
pub use provider::parse_window;
pub use provider::MarketDataProvider;
pub use series::PriceBar;
pub use series::PriceSeries;
pub use series::PriceTable;
#[cfg(feature = "yahoo")]
pub use yahoo::YahooProvider;
