//! Convenience macros for firing callbacks.

/// Builds a `CallbackArgs` from positional values and optional keywords.
///
/// Every value goes through `serde_json::json!`, so anything it accepts works.
///
/// # Example
/// ```rust,ignore
/// let args = callback_args![123];
/// let args = callback_args![0, "/help"; "source" => "chat"];
/// ```
#[macro_export]
macro_rules! callback_args {
    () => {
        $crate::prelude::CallbackArgs::new()
    };
    ($($arg:expr),+ $(,)?) => {{
        let mut args = $crate::prelude::CallbackArgs::new();
        $(
            args = args.with_arg($crate::__serde_json::json!($arg));
        )+
        args
    }};
    ($($arg:expr),* ; $($key:expr => $value:expr),* $(,)?) => {{
        let mut args = $crate::prelude::CallbackArgs::new();
        $(
            args = args.with_arg($crate::__serde_json::json!($arg));
        )*
        $(
            args = args.with_kwarg($key, $crate::__serde_json::json!($value));
        )*
        args
    }};
}
