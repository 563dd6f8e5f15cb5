pub mod controller;
pub mod highlight;
pub mod list;
pub mod script;

pub use controller::{DragPhase, DropOutcome, Editor};
pub use list::{Element, ElementKey, ElementList};
