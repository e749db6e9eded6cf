//! Call-site logging macros
//!
//! Each level macro formats its arguments like `format!` and records the
//! caller's file and line. Without a logger argument the message goes to the
//! process-wide logger; `log_info!(logger; "...")` sends it to `logger`
//! instead (anything that derefs to a [`crate::Log`]).

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, $logger:expr; $($arg:tt)+) => {{
        use $crate::Log as _;
        $logger.log(
            $level,
            &::std::format!($($arg)+),
            ::std::file!(),
            ::std::line!(),
        )
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::registry::log(
            $level,
            &::std::format!($($arg)+),
            ::std::file!(),
            ::std::line!(),
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::__log_at!($crate::LogLevel::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::__log_at!($crate::LogLevel::Info, $($arg)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => { $crate::__log_at!($crate::LogLevel::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::__log_at!($crate::LogLevel::Error, $($arg)+) };
}

/// Name of the enclosing function, without its module path
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let mut name = type_name_of(__here);
        name = name.strip_suffix("::__here").unwrap_or(name);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        name.rsplit("::").next().unwrap_or(name)
    }};
}

/// Log with the body `[function:<name>] <message>` to the process-wide logger
#[macro_export]
macro_rules! log_fn {
    ($level:expr, $($arg:tt)+) => {
        $crate::registry::log(
            $level,
            &::std::format!(
                "[function:{}] {}",
                $crate::function_name!(),
                ::std::format_args!($($arg)+)
            ),
            ::std::file!(),
            ::std::line!(),
        )
    };
}
