pub mod endpoints;
pub mod widget_config;

pub use endpoints::WidgetEndpoints;
pub use widget_config::{ ConfigLoadError, RemoteThemeClient, ThemeFetcher };
