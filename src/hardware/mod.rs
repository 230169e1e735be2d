//! Hardware abstraction
//!
//! In-memory state of the controls the surface components talk to:
//! - `Button` - press state and value listeners
//! - `DisplayLine` - a line of fixed-width segments fed by data sources
//!
//! How this state reaches a physical device is out of scope here.

pub mod button;
pub mod display;

pub use button::{Button, ButtonRef};
pub use display::{DataSourceRef, DisplayDataSource, DisplayLine};
