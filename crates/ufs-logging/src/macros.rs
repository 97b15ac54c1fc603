//! ---
//! ufs_section: "03-persistence-logging"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Structured logging adapters and sinks."
//! ufs_version: "v0.0.0-prealpha"
//! ufs_owner: "tbd"
//! ---

#[doc(hidden)]
#[macro_export]
macro_rules! __ufs_event {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            $level,
            session = ctx.session.unwrap_or(""),
            tick = ctx.tick.unwrap_or_default(),
            speed = ctx.speed.unwrap_or_default(),
            status = ctx.status.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational log enriched with session context.
#[macro_export]
macro_rules! ufs_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__ufs_event!(tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__ufs_event!(tracing::Level::INFO, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a debug log enriched with session context.
#[macro_export]
macro_rules! ufs_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__ufs_event!(tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__ufs_event!(tracing::Level::DEBUG, $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a warning enriched with session context.
#[macro_export]
macro_rules! ufs_warn {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__ufs_event!(tracing::Level::WARN, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__ufs_event!(tracing::Level::WARN, $crate::LogContext::default(), $($arg)+)
    };
}
