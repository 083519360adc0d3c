pub mod chat;
pub mod widget;

pub use chat::{ Role, SendRequest, WidgetMessage };
pub use widget::{ Position, WidgetConfig, WidgetTheme };
