//! Registry trait for self-registering implementations.
//!
//! Pluggable components (currently the storage backends) expose a `Registry`
//! type implementing this trait, pairing the name used in configuration with
//! the factory that builds the component.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// for example `"memory"` for `[storage.implementations.memory]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds this implementation from its configuration.
	fn factory() -> Self::Factory;
}
