//! Factory symbols - the two entry points every plugin library exports

use serde::{Deserialize, Serialize};

/// Exported name of the function creating the facade singleton
pub const CREATE_SYMBOL: &str = "createPluginFacade";

/// Exported name of the function destroying the facade singleton
pub const DESTROY_SYMBOL: &str = "destroyPluginFacade";

/// Names of the create/destroy pair resolved by the loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorySymbols {
    pub create: String,
    pub destroy: String,
}

impl Default for FactorySymbols {
    fn default() -> Self {
        Self {
            create: CREATE_SYMBOL.to_string(),
            destroy: DESTROY_SYMBOL.to_string(),
        }
    }
}

/// Export the factory pair for a plugin facade.
///
/// Must be invoked once, at the root of a `cdylib` crate:
///
/// ```ignore
/// plugin_loader::declare_plugin!(MyPlugin as dyn plugin_loader::Plugin, MyPlugin::new());
/// ```
///
/// The create symbol returns the same pointer until the destroy symbol runs;
/// destroy drops the instance so the next create builds a fresh one. The facade
/// type must be `Send` because the singleton lives in a static.
///
/// Custom symbol names can be given for loaders configured with a
/// non-default [`FactorySymbols`]:
///
/// ```ignore
/// plugin_loader::declare_plugin!(
///     MyPlugin as dyn plugin_loader::Plugin,
///     MyPlugin::new(),
///     create = "my_create",
///     destroy = "my_destroy"
/// );
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($facade:ty as $iface:ty, $ctor:expr $(,)?) => {
        $crate::declare_plugin!(
            $facade as $iface,
            $ctor,
            create = "createPluginFacade",
            destroy = "destroyPluginFacade"
        );
    };
    ($facade:ty as $iface:ty, $ctor:expr, create = $create:literal, destroy = $destroy:literal $(,)?) => {
        #[doc(hidden)]
        static __PLUGIN_FACADE: ::std::sync::Mutex<::std::option::Option<::std::boxed::Box<$facade>>> =
            ::std::sync::Mutex::new(::std::option::Option::None);

        #[doc(hidden)]
        #[export_name = $create]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn __plugin_create_facade() -> *mut $iface {
            let mut slot = __PLUGIN_FACADE
                .lock()
                .unwrap_or_else(::std::sync::PoisonError::into_inner);
            let facade: &mut $facade = slot.get_or_insert_with(|| ::std::boxed::Box::new($ctor));
            facade as *mut $facade as *mut $iface
        }

        #[doc(hidden)]
        #[export_name = $destroy]
        pub extern "C" fn __plugin_destroy_facade() {
            let facade = __PLUGIN_FACADE
                .lock()
                .unwrap_or_else(::std::sync::PoisonError::into_inner)
                .take();
            ::std::mem::drop(facade);
        }
    };
}
