//! Named-constant registry.
//!
//! The harness reads timing scales, type sizes, signal numbers, socket
//! modes/protocols, and thread states by key from a [`ConstantProvider`];
//! it never defines the values itself. [`NativeConstants`] is the provider
//! backed by the host: signal numbers come from `libc`, type sizes from
//! `size_of`, the directory separator from `std::path`.

use crate::error::{CapError, CapResult};

/// A registry value: integer, real, or string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantValue {
    Int(i64),
    Real(f64),
    Str(&'static str),
}

impl std::fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Real(v) => write!(f, "{v}"),
            ConstantValue::Str(v) => write!(f, "{v}"),
        }
    }
}

/// Lookup contract the harness consumes.
pub trait ConstantProvider {
    /// Resolve `key`, failing with [`CapError::NotFound`] for unknown keys.
    fn constant(&self, key: &str) -> CapResult<ConstantValue>;
}

// ---------------------------------------------------------------------------
// Key groups (iteration order used by the harness)
// ---------------------------------------------------------------------------

/// Core scale constants and the path separator.
pub const CORE_KEYS: &[&str] = &[
    "INT_ONE_THOUSAND",
    "REAL_ONE_THOUSAND",
    "INT_ONE_MILLION",
    "REAL_ONE_MILLION",
    "INT_ONE_BILLION",
    "REAL_ONE_BILLION",
    "DIR_SEPARATOR",
];

/// Primitive type sizes on the host.
pub const SIZE_KEYS: &[&str] = &[
    "SIZEOF_BOOLEAN",
    "SIZEOF_ALINT",
    "SIZEOF_AULINT",
    "SIZEOF_CHAR",
    "SIZEOF_SHORT",
    "SIZEOF_INT",
    "SIZEOF_FLOAT",
    "SIZEOF_DOUBLE",
];

/// Native signal numbers.
pub const SIGNAL_KEYS: &[&str] = &[
    "SIGNAL_INTERRUPT",
    "SIGNAL_TERMINATE",
    "SIGNAL_SEGFAULT",
    "SIGNAL_USERONE",
    "SIGNAL_USERTWO",
    "SIGNAL_QUIT",
    "SIGNAL_ABORT",
    "SIGNAL_FLOATING_POINT_EXCEPTION",
    "SIGNAL_ILLEGAL",
];

/// Socket mode and protocol discriminants.
pub const SOCKET_KEYS: &[&str] = &[
    "SOCKET_MODE_CLIENT",
    "SOCKET_MODE_SERVER",
    "SOCKET_PROTOCOL_TCPIP",
    "SOCKET_PROTOCOL_UDP",
];

/// Thread lifecycle state discriminants.
pub const THREAD_KEYS: &[&str] = &[
    "THREAD_STATE_INIT",
    "THREAD_STATE_RUNNING",
    "THREAD_STATE_HALT",
    "THREAD_STATE_STOPPED",
    "THREAD_STATE_ERROR",
];

// ---------------------------------------------------------------------------
// Native provider
// ---------------------------------------------------------------------------

/// Provider backed by the host toolchain and `libc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConstants;

impl ConstantProvider for NativeConstants {
    fn constant(&self, key: &str) -> CapResult<ConstantValue> {
        use ConstantValue::{Int, Real, Str};

        let value = match key {
            "INT_ONE_THOUSAND" => Int(1_000),
            "REAL_ONE_THOUSAND" => Real(1_000.0),
            "INT_ONE_MILLION" => Int(1_000_000),
            "REAL_ONE_MILLION" => Real(1_000_000.0),
            "INT_ONE_BILLION" => Int(1_000_000_000),
            "REAL_ONE_BILLION" => Real(1_000_000_000.0),
            "DIR_SEPARATOR" => Str(std::path::MAIN_SEPARATOR_STR),

            "SIZEOF_BOOLEAN" => Int(size_of::<bool>() as i64),
            "SIZEOF_ALINT" => Int(size_of::<i64>() as i64),
            "SIZEOF_AULINT" => Int(size_of::<u64>() as i64),
            "SIZEOF_CHAR" => Int(size_of::<libc::c_char>() as i64),
            "SIZEOF_SHORT" => Int(size_of::<libc::c_short>() as i64),
            "SIZEOF_INT" => Int(size_of::<libc::c_int>() as i64),
            "SIZEOF_FLOAT" => Int(size_of::<f32>() as i64),
            "SIZEOF_DOUBLE" => Int(size_of::<f64>() as i64),

            "SIGNAL_INTERRUPT" => Int(i64::from(libc::SIGINT)),
            "SIGNAL_TERMINATE" => Int(i64::from(libc::SIGTERM)),
            "SIGNAL_SEGFAULT" => Int(i64::from(libc::SIGSEGV)),
            "SIGNAL_USERONE" => Int(i64::from(libc::SIGUSR1)),
            "SIGNAL_USERTWO" => Int(i64::from(libc::SIGUSR2)),
            "SIGNAL_QUIT" => Int(i64::from(libc::SIGQUIT)),
            "SIGNAL_ABORT" => Int(i64::from(libc::SIGABRT)),
            "SIGNAL_FLOATING_POINT_EXCEPTION" => Int(i64::from(libc::SIGFPE)),
            "SIGNAL_ILLEGAL" => Int(i64::from(libc::SIGILL)),

            "SOCKET_MODE_CLIENT" => Int(0),
            "SOCKET_MODE_SERVER" => Int(1),
            "SOCKET_PROTOCOL_TCPIP" => Int(0),
            "SOCKET_PROTOCOL_UDP" => Int(1),

            "THREAD_STATE_INIT" => Int(0),
            "THREAD_STATE_RUNNING" => Int(1),
            "THREAD_STATE_HALT" => Int(2),
            "THREAD_STATE_STOPPED" => Int(3),
            "THREAD_STATE_ERROR" => Int(4),

            _ => return Err(CapError::NotFound(format!("constant '{key}'"))),
        };

        Ok(value)
    }
}
