//! Small declarative helpers shared by the HTTP apps

#[cfg(feature = "actix")]
pub use actix_web;

/// Generate a `routes` function registering handlers with an actix
/// `ServiceConfig`.
///
/// `route handler` registers a handler built with the actix route macros,
/// `load module` pulls in the `routes` function of a child module.
///
/// ```ignore
/// macros_utils::routes! {
///     load health,
///     route list_targets,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($($kind:ident $item:ident),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::actix_web::web::ServiceConfig) {
            $( $crate::__routes_entry!(cfg, $kind $item); )*
        }
    };
}

#[cfg(feature = "actix")]
#[doc(hidden)]
#[macro_export]
macro_rules! __routes_entry {
    ($cfg:ident, route $handler:ident) => {
        $cfg.service($handler);
    };
    ($cfg:ident, load $module:ident) => {
        $cfg.configure($module::routes);
    };
}
