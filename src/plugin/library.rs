//! Dynamic library primitive - open, resolve, close
//!
//! `DynamicLibrary` is the seam between the loader state machine and the
//! platform loader. `NativeLibrary` is the libloading-backed implementation:
//! `dlopen`/`dlsym`/`dlclose` on unix, `LoadLibraryExW`/`GetProcAddress`/
//! `FreeLibrary` on windows. Library static initializers run inside `open`.

use crate::config::SymbolBinding;
use crate::error::{Error, Result};
use std::ffi::{c_void, OsStr, OsString};
use std::ptr::NonNull;

/// Returned by [`DynamicLibrary::close`] when the platform refuses to unmap.
///
/// `library` holds the handle when the backend can give it back, so the
/// caller can retry later.
#[derive(Debug)]
pub struct CloseFailure<L> {
    pub library: Option<L>,
    pub error: Error,
}

/// A mapped dynamic library
pub trait DynamicLibrary: Sized {
    /// Map a library by bare name, relative path, or absolute path.
    fn open(name: &OsStr, binding: SymbolBinding) -> Result<Self>;

    /// Address of an exported symbol.
    fn symbol(&self, name: &str) -> Result<NonNull<c_void>>;

    /// Unmap the library.
    fn close(self) -> std::result::Result<(), CloseFailure<Self>>;
}

/// OS-backed library handle
#[derive(Debug)]
pub struct NativeLibrary {
    name: String,
    inner: libloading::Library,
}

impl NativeLibrary {
    #[cfg(unix)]
    fn open_native(
        name: &OsStr,
        binding: SymbolBinding,
    ) -> std::result::Result<libloading::Library, libloading::Error> {
        use libloading::os::unix::{Library, RTLD_LAZY, RTLD_LOCAL, RTLD_NOW};

        let flags = match binding {
            SymbolBinding::Lazy => RTLD_LAZY,
            SymbolBinding::Now => RTLD_NOW,
        };
        // SAFETY: running the library's initializers is the accepted cost of loading it
        unsafe { Library::open(Some(name), flags | RTLD_LOCAL) }.map(Into::into)
    }

    #[cfg(windows)]
    fn open_native(
        name: &OsStr,
        _binding: SymbolBinding,
    ) -> std::result::Result<libloading::Library, libloading::Error> {
        // Windows resolves imports at load time; there is no lazy binding.
        unsafe { libloading::Library::new(name) }
    }

    /// Name the library was opened with
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl DynamicLibrary for NativeLibrary {
    fn open(name: &OsStr, binding: SymbolBinding) -> Result<Self> {
        let display = name.to_string_lossy().into_owned();
        let inner = Self::open_native(name, binding).map_err(|e| Error::Open {
            library: display.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: display,
            inner,
        })
    }

    fn symbol(&self, name: &str) -> Result<NonNull<c_void>> {
        let not_found = |reason: String| Error::SymbolNotFound {
            library: self.name.clone(),
            symbol: name.to_string(),
            reason,
        };

        // SAFETY: the symbol is read as an opaque address and never dereferenced here
        let address = unsafe { self.inner.get::<*mut c_void>(name.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|e| not_found(e.to_string()))?;

        NonNull::new(address).ok_or_else(|| not_found("symbol resolves to null".to_string()))
    }

    fn close(self) -> std::result::Result<(), CloseFailure<Self>> {
        let name = self.name;
        // libloading releases its handle even when the platform call fails.
        self.inner.close().map_err(|e| CloseFailure {
            library: None,
            error: Error::Close {
                library: name,
                reason: e.to_string(),
            },
        })
    }
}

/// Platform file name for a plugin stem: `libExample.so`, `libExample.dylib`, `Example.dll`.
pub fn library_filename(stem: impl AsRef<OsStr>) -> OsString {
    libloading::library_filename(stem)
}
