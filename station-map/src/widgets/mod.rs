mod popup;
mod ride_actions;
pub use popup::WidgetPopup;
pub use ride_actions::RideActions;
