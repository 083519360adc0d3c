pub mod controller;
pub mod dom;
pub mod host;
pub mod icons;
pub mod styles;

pub use controller::{ ChatController, PendingSend, UiEvent, EMPTY_STATE_TEXT, FALLBACK_REPLY };
pub use dom::{ Element, Node };
pub use host::{ lock_host, HeadlessHost, HeadlessRoot, HostError, RootId, SharedHost, WidgetHost };
