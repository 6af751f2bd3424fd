//! Plugin loader - maps a plugin library and manages its facade singleton
//!
//! State machine:
//! - `Unloaded --load()--> Loaded`
//! - `Loaded --instance()--> Active` (create symbol invoked once, result cached)
//! - `any --unload()--> Unloaded` (destroy symbol invoked first when `Active`)
//!
//! `load()` on a loaded loader unloads first. Dropping the loader unloads.

use super::factory::FactorySymbols;
use super::library::{CloseFailure, DynamicLibrary, NativeLibrary};
use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use tracing::{debug, info, warn};

type DestroyFacadeFn = unsafe extern "C" fn();

/// Observable loader state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// No library mapped
    Unloaded,
    /// Library mapped, facade not created yet
    Loaded,
    /// Library mapped and facade cached
    Active,
}

impl fmt::Display for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            LoaderState::Unloaded => "unloaded",
            LoaderState::Loaded => "loaded",
            LoaderState::Active => "active",
        };
        f.write_str(state)
    }
}

/// Non-owning reference to the facade plus the entry point that frees it
struct Facade<T: ?Sized> {
    instance: NonNull<T>,
    destroy: DestroyFacadeFn,
}

/// Loader of a single plugin library
///
/// `T` is the interface the facade implements, usually `dyn Plugin` or a
/// trait object extending it. The facade is owned by the plugin library; the
/// references handed out borrow the loader, so they cannot outlive `unload()`
/// or the loader itself.
///
/// # Safety contract
/// The library must export the configured create symbol as
/// `extern "C" fn() -> *mut T` and the destroy symbol as `extern "C" fn()`,
/// built with the same compiler and the same definition of `T`. This cannot be
/// checked at runtime; only the presence of the symbols is.
pub struct PluginLoader<T: ?Sized, L: DynamicLibrary = NativeLibrary> {
    name: PathBuf,
    config: LoaderConfig,
    library: Option<L>,
    facade: Option<Facade<T>>,
    last_error: String,
}

impl<T: ?Sized> PluginLoader<T> {
    /// Create an unloaded loader for a native library.
    ///
    /// A bare file name is searched with the platform rules (library path,
    /// `PATH` on windows), an absolute path is used as-is and a relative path
    /// is resolved against the current working directory.
    pub fn new(name: impl Into<PathBuf>) -> Self {
        Self::with_config(name, LoaderConfig::default())
    }
}

impl<T: ?Sized, L: DynamicLibrary> PluginLoader<T, L> {
    /// Create an unloaded loader with explicit symbol names and binding mode
    pub fn with_config(name: impl Into<PathBuf>, config: LoaderConfig) -> Self {
        Self {
            name: name.into(),
            config,
            library: None,
            facade: None,
            last_error: String::new(),
        }
    }

    /// Library name or path
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// Change the library name. A mapped library is kept until the next `load()`.
    pub fn set_name(&mut self, name: impl Into<PathBuf>) {
        self.name = name.into();
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn symbols(&self) -> &FactorySymbols {
        &self.config.symbols
    }

    pub fn state(&self) -> LoaderState {
        match (&self.library, &self.facade) {
            (None, _) => LoaderState::Unloaded,
            (Some(_), None) => LoaderState::Loaded,
            (Some(_), Some(_)) => LoaderState::Active,
        }
    }

    /// True when the library is mapped, with or without a facade
    pub fn is_loaded(&self) -> bool {
        self.library.is_some()
    }

    /// Text of the last failure. Empty when nothing failed since the last
    /// successful `load()`.
    pub fn error_msg(&self) -> &str {
        &self.last_error
    }

    /// Map the library. Does not create the facade.
    ///
    /// Any previously mapped library is unloaded first, so on return the
    /// loader is either freshly `Loaded` or `Unloaded`.
    pub fn load(&mut self) -> Result<()> {
        if self.is_loaded() {
            if let Err(e) = self.unload() {
                warn!(
                    library = %self.name.display(),
                    error = %e,
                    "Releasing previous library after failed unload"
                );
                self.library = None;
            }
        }

        if self.name.as_os_str().is_empty() {
            return Err(self.fail(Error::EmptyName));
        }

        match L::open(self.name.as_os_str(), self.config.binding) {
            Ok(library) => {
                self.library = Some(library);
                self.last_error.clear();
                info!(library = %self.name.display(), binding = ?self.config.binding, "Plugin library loaded");
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Unload the plugin
    ///
    /// Destroys the facade if it was created, then unmaps the library. A no-op
    /// when nothing is loaded. When unmapping fails the facade is still gone;
    /// the handle is kept only if the backend returned it.
    pub fn unload(&mut self) -> Result<()> {
        let Some(library) = self.library.take() else {
            return Ok(());
        };

        if let Some(facade) = self.facade.take() {
            // SAFETY: `destroy` was resolved from `library`, which is still mapped
            unsafe { (facade.destroy)() };
            debug!(library = %self.name.display(), "Plugin facade destroyed");
        }

        match library.close() {
            Ok(()) => {
                info!(library = %self.name.display(), "Plugin library unloaded");
                Ok(())
            }
            Err(CloseFailure { library, error }) => {
                self.library = library;
                Err(self.fail(error))
            }
        }
    }

    /// Get the plugin facade, creating it on first call.
    ///
    /// Returns `Ok(None)` when no library is loaded. A library that lacks
    /// either factory symbol yields `Error::SymbolNotFound` and stays `Loaded`.
    pub fn instance(&mut self) -> Result<Option<&T>> {
        let Some(library) = self.library.as_ref() else {
            return Ok(None);
        };

        if self.facade.is_none() {
            match self.create_facade(library) {
                Ok(facade) => self.facade = Some(facade),
                Err(e) => return Err(self.fail(e)),
            }
        }

        // SAFETY: the owning library stays mapped for as long as `self` is borrowed
        Ok(self
            .facade
            .as_ref()
            .map(|facade| unsafe { facade.instance.as_ref() }))
    }

    fn create_facade(&self, library: &L) -> Result<Facade<T>> {
        let symbols = &self.config.symbols;

        // Both symbols are resolved up front so an active facade can always be destroyed.
        let create_address = library.symbol(&symbols.create)?;
        let destroy_address = library.symbol(&symbols.destroy)?;
        debug!(
            library = %self.name.display(),
            create = %symbols.create,
            destroy = %symbols.destroy,
            "Resolved plugin factory symbols"
        );

        // SAFETY: plugin contract, see the type-level documentation
        let create: unsafe extern "C" fn() -> *mut T =
            unsafe { std::mem::transmute_copy(&create_address) };
        let destroy: DestroyFacadeFn = unsafe { std::mem::transmute_copy(&destroy_address) };

        let instance = NonNull::new(unsafe { create() }).ok_or_else(|| Error::NullFacade {
            library: self.name.display().to_string(),
            symbol: symbols.create.clone(),
        })?;
        info!(library = %self.name.display(), "Plugin facade created");

        Ok(Facade { instance, destroy })
    }

    fn fail(&mut self, error: Error) -> Error {
        self.last_error = error.to_string();
        error
    }
}

impl<T: ?Sized, L: DynamicLibrary> Drop for PluginLoader<T, L> {
    fn drop(&mut self) {
        if let Err(e) = self.unload() {
            warn!(
                library = %self.name.display(),
                error = %e,
                "Failed to unload plugin library on drop"
            );
        }
    }
}

impl<T: ?Sized, L: DynamicLibrary> fmt::Debug for PluginLoader<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLoader")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("symbols", &self.config.symbols)
            .field("last_error", &self.last_error)
            .finish()
    }
}
