//! Plugin system
//!
//! A plugin is a native dynamic library that exports two C-linkage functions:
//! - `createPluginFacade`: returns a pointer to the library's facade singleton
//! - `destroyPluginFacade`: drops that singleton
//!
//! The facade implements [`Plugin`] (or a trait built on it). Plugin crates
//! generate both exports with [`declare_plugin!`](crate::declare_plugin); hosts
//! drive them through [`PluginLoader`].
//!
//! ```no_run
//! use plugin_loader::{Plugin, PluginLoader};
//!
//! let mut loader: PluginLoader<dyn Plugin> = PluginLoader::new("./libexample_plugin.so");
//! loader.load()?;
//! if let Some(plugin) = loader.instance()? {
//!     println!("{} {}", plugin.name(), plugin.version());
//! }
//! loader.unload()?;
//! # Ok::<(), plugin_loader::error::Error>(())
//! ```

pub mod factory;
pub mod library;
pub mod loader;
pub mod traits;

pub use factory::{FactorySymbols, CREATE_SYMBOL, DESTROY_SYMBOL};
pub use library::{library_filename, CloseFailure, DynamicLibrary, NativeLibrary};
pub use loader::{LoaderState, PluginLoader};
pub use traits::{Plugin, PluginMetadata, Version};
