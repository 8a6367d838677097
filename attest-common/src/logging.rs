//! Logging utilities for the attestation nodes.

use slog::Logger;

/// Extension trait for `slog::Logger`
pub trait LoggerExtensions {
    /// Create a new child logger with a `src` key containing the component name.
    fn new_with_component_name<T>(&self) -> Self;

    /// Create a new child logger with a `src` key containing the provided name.
    fn new_with_name(&self, name: &str) -> Self;

    /// Create a new child logger with a `cid` key, used by everything bound to a single
    /// attested content.
    fn new_with_cid(&self, cid: &str) -> Self;
}

impl LoggerExtensions for Logger {
    fn new_with_component_name<T>(&self) -> Self {
        self.new_with_name(component_name::<T>())
    }

    fn new_with_name(&self, name: &str) -> Self {
        self.new(slog::o!("src" => name.to_owned()))
    }

    fn new_with_cid(&self, cid: &str) -> Self {
        self.new(slog::o!("cid" => cid.to_owned()))
    }
}

/// Last path segment of a type name, without its generic parameters.
fn component_name<T>() -> &'static str {
    let complete_name = std::any::type_name::<T>();
    let without_generic = complete_name
        .split_once('<')
        .map_or(complete_name, |(name, _)| name);

    without_generic
        .rsplit("::")
        .next()
        .unwrap_or(complete_name)
}
