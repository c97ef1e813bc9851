//! Wave portal application core: the controller that views drive, its
//! error taxonomy and the wave list it renders from.

pub mod controller;
pub mod error;
pub mod wave_list;

pub use controller::{ConnectionState, NO_WALLET_ALERT, PortalController, PortalSnapshot};
pub use error::PortalError;
pub use wave_list::WaveList;
