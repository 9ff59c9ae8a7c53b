//! Audiofix tweak for ModHub.
//!
//! Stops the host's in-call audio routing from hijacking the volume UI by
//! neutralizing three audio-manager members. The tweak itself is pure
//! configuration: resolution strategies plus patch descriptors handed to
//! the interception registry.

pub mod tweak;

pub use tweak::AudiofixTweak;
