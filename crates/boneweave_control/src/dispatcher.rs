//! Mechanism Dispatcher
//!
//! Routes a `(name, payload)` pair from a front-end to one controller setter.
//! The name table only resolves strings to [`MechanismKind`]; the set of
//! mechanisms itself is the closed enum.

use boneweave_core::errors::{BoneError, Result};
use rustc_hash::FxHashMap;

use crate::controller::BoneController;
use crate::mechanism::{Mechanism, MechanismKind};
use crate::payload::Payload;

#[derive(Debug, Clone)]
pub struct MechanismDispatcher {
    table: FxHashMap<&'static str, MechanismKind>,
}

impl Default for MechanismDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MechanismDispatcher {
    #[must_use]
    pub fn new() -> Self {
        let table = MechanismKind::ALL
            .into_iter()
            .map(|kind| (kind.name(), kind))
            .collect();
        Self { table }
    }

    /// Resolves and validates a mechanism without applying it.
    pub fn parse(&self, name: &str, payload: &Payload) -> Result<Mechanism> {
        let kind = self
            .table
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| BoneError::invalid_payload(name, "unknown mechanism"))?;
        kind.parse(payload)
    }

    /// Validates `payload` and applies it to `controller`.
    ///
    /// An unknown name or malformed payload is reported before the controller
    /// is touched. Returns whether the renderer reported a change.
    pub fn dispatch(
        &self,
        controller: &BoneController,
        name: &str,
        payload: &Payload,
    ) -> Result<bool> {
        let mechanism = self.parse(name, payload)?;
        let kind = mechanism.kind();
        let changed = mechanism.apply(controller)?;
        log::debug!(
            "Applied '{kind}' = {payload} to {} (changed: {changed})",
            controller.key()
        );
        Ok(changed)
    }

    /// Registered mechanism names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cover_the_vocabulary() {
        let dispatcher = MechanismDispatcher::new();
        let names = dispatcher.names();
        assert_eq!(names.len(), MechanismKind::ALL.len());
        assert!(names.contains(&"interpolation_duration"));
        assert!(names.contains(&"shadow_radius"));
    }

    #[test]
    fn unknown_name_is_invalid_payload() {
        let err = MechanismDispatcher::new()
            .parse("explode", &Payload::Bool(true))
            .unwrap_err();
        assert_eq!(err.kind(), boneweave_core::ErrorKind::InvalidPayload);
        assert_eq!(
            err.to_string(),
            "Invalid payload for 'explode': unknown mechanism"
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        let dispatcher = MechanismDispatcher::new();
        assert!(dispatcher.parse(" Glow ", &Payload::Bool(true)).is_ok());
    }
}
