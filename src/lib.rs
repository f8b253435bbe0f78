pub mod algo;
pub mod error;
pub mod logging;
pub mod ops;

#[cfg(feature = "lsp")]
pub mod lsp;
#[cfg(feature = "mcp")]
pub mod mcp;

#[cfg(feature = "plugin")]
pub mod commands;

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

#[cfg(feature = "plugin")]
pub struct SiteplanPlugin;

#[cfg(feature = "plugin")]
impl Plugin for SiteplanPlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        let mut list: Vec<Box<dyn PluginCommand<Plugin = Self>>> = vec![
            Box::new(commands::Parse),
            Box::new(commands::Analyze),
            Box::new(commands::Reattach),
            Box::new(commands::Tree),
            Box::new(commands::Health),
            Box::new(commands::Table),
            Box::new(commands::Summary),
            Box::new(commands::Export),
        ];
        #[cfg(feature = "cache")]
        list.push(Box::new(commands::Results));
        list
    }
}
