//! `op`/`event` logging for store and collection operations
//!
//! Every operation logs a `start` event and then exactly one of `end` or
//! `end_error`, all carrying `component` and `op`. Extra `key = value` fields
//! are passed through to `tracing` unchanged.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:ident $(, $($rest:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::hotdeck_core_types::schema::$event,
            $($($rest)*)?
        )
    };
}

/// `start` event at INFO
///
/// ```
/// # use hotdeck_core::log_op_start;
/// log_op_start!("store_load");
/// log_op_start!("store_load", store = "lens-hotbar-store");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// `end` event at INFO; `duration_ms` is required
///
/// ```
/// # use hotdeck_core::log_op_end;
/// log_op_end!("store_flush", duration_ms = 3, keys = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_END, duration_ms = $duration $(, $($field)*)?)
    };
}

/// `end_error` event at ERROR with `err.kind`, `err.code` and the rendered
/// error as message
///
/// `$err` is anything that converts into `ExError`.
///
/// ```
/// # use hotdeck_core::{log_op_error, errors::HotbarError};
/// let err = HotbarError::HotbarNotFound { hotbar_id: "h1".to_string() };
/// log_op_error!("remove_hotbar", err, duration_ms = 10, hotbar_id = "h1");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($($field)*,)?
            "{}",
            ex_err
        );
    }};
}
