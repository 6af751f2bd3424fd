// plugin-loader - Native plugin loading
// Maps plugin libraries at runtime and manages the facade singleton they export

#![warn(rust_2018_idioms)]

pub mod config;
pub mod plugin;

// Re-exports for convenience
pub use config::{LoaderConfig, SymbolBinding};
pub use plugin::{
    library_filename, DynamicLibrary, FactorySymbols, LoaderState, NativeLibrary, Plugin,
    PluginLoader, PluginMetadata, Version,
};

/// Plugin loader error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("No library name configured")]
        EmptyName,

        #[error("Cannot load library '{library}': {reason}")]
        Open { library: String, reason: String },

        #[error("Cannot unload library '{library}': {reason}")]
        Close { library: String, reason: String },

        #[error("Symbol '{symbol}' not found in '{library}': {reason}")]
        SymbolNotFound {
            library: String,
            symbol: String,
            reason: String,
        },

        #[error("Symbol '{symbol}' in '{library}' returned a null facade")]
        NullFacade { library: String, symbol: String },

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::error::Error;

    #[test]
    fn test_error_messages_name_the_library() {
        let err = Error::SymbolNotFound {
            library: "libExample.so".to_string(),
            symbol: "createPluginFacade".to_string(),
            reason: "undefined symbol".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Symbol 'createPluginFacade' not found in 'libExample.so': undefined symbol"
        );
        assert_eq!(Error::EmptyName.to_string(), "No library name configured");
    }
}
