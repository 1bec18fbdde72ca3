/// Path of the enclosing function, e.g. `demo::worker::run`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        match name.strip_suffix("::f") {
            Some(stripped) => stripped,
            None => name,
        }
    }};
}

#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite {
            file: file!(),
            line: line!(),
            function: $crate::function_name!(),
        }
    };
}

/// `log!(component, level, template, args...)` with printf-style verbs:
///
/// ```no_run
/// ring_logger::log!("auth", "WARNING", "%d failed logins for %q", 3, "bob");
/// ```
#[macro_export]
macro_rules! log {
    ($component:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::emit(
            $component,
            $level,
            $template,
            &[$(&$arg as &dyn ::std::fmt::Display),*],
            $crate::call_site!(),
        )
    };
}

#[macro_export]
macro_rules! dbgrm {
    ($component:expr, $($arg:tt)*) => {
        $crate::log!($component, "DBGRM", $($arg)*)
    }
}

#[macro_export]
macro_rules! debug {
    ($component:expr, $($arg:tt)*) => {
        $crate::log!($component, "DEBUG", $($arg)*)
    }
}

#[macro_export]
macro_rules! info {
    ($component:expr, $($arg:tt)*) => {
        $crate::log!($component, "INFO", $($arg)*)
    }
}

#[macro_export]
macro_rules! warning {
    ($component:expr, $($arg:tt)*) => {
        $crate::log!($component, "WARNING", $($arg)*)
    }
}

#[macro_export]
macro_rules! error {
    ($component:expr, $($arg:tt)*) => {
        $crate::log!($component, "ERROR", $($arg)*)
    }
}
