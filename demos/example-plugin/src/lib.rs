//! Example plugin
//!
//! Exports `createPluginFacade` / `destroyPluginFacade` for an `ExamplePlugin`
//! facade named "Example", version 1.3.4.2.

use plugin_loader::{Plugin, Version};

/// Example plugin facade
#[derive(Debug)]
pub struct ExamplePlugin {
    name: String,
    version: Version,
}

impl ExamplePlugin {
    pub fn new() -> Self {
        Self {
            name: "Example".to_string(),
            version: Version::new(1, 3, 4, 2),
        }
    }
}

impl Default for ExamplePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ExamplePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Version {
        self.version
    }
}

plugin_loader::declare_plugin!(ExamplePlugin as dyn Plugin, ExamplePlugin::new());
