//! Events flowing from the client core to the view layer.

mod navigation;

pub use navigation::{NavigationBus, NavigationEvent};
