#![warn(missing_docs)]
//! Keyed registries and tagged-union codecs for effect families.
//!
//! # Architecture
//!
//! - [`RegistryBuilder`] / [`Registry`] - registration-time and frozen
//!   key -> value maps, with [`RegistryCell`] as the explicit freeze point
//! - [`Descriptor`] - codec for one concrete variant of an [`EffectFamily`]
//! - [`VariantRegistry`] - key <-> descriptor bijection for one family
//! - [`DispatchCodec`] - encodes/decodes a family value as
//!   `{ "type": <key>, ...fields }`
//! - [`PreRegistration`] - startup hooks that populate registries before
//!   they are frozen
//!
//! # Example
//!
//! ```ignore
//! let mut variants = VariantRegistry::<SkyEffects>::new();
//! variants.register(RegistryKey::limlib("static")?, StaticSkyEffects::descriptor())?;
//! let codec = DispatchCodec::new(variants.freeze());
//! let json = codec.encode(&sky)?;
//! ```

mod builder;
mod codec;
mod dispatch;
mod error;
mod prereg;
mod variants;

pub use builder::{Registry, RegistryBuilder, RegistryCell};
pub use codec::{Descriptor, DescriptorId, EffectFamily, FieldReader, Record};
pub use dispatch::DispatchCodec;
pub use error::{json_kind, CodecError, RegistryError};
pub use limlib_core::{RegistryKey, RegistryKeyError};
pub use prereg::{PreRegistration, PreRegistrations};
pub use variants::{VariantRegistry, VariantTable};
