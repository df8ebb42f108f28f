//! Bone and model identity.
//!
//! A [`BoneKey`] names one bone of one model instance on one entity. It is the
//! only key the controller cache uses. Keys own their names behind `Arc<str>`,
//! so cloning a key is cheap and dropping the last key releases its names.
//!
//! The textual form is `bone@<entity-uuid>,<model>,<bone>`. Model and bone
//! names may not contain the `,` delimiter, which keeps the encoding
//! collision-free.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{BoneError, Result};

/// Separator between the key components in the encoded form.
pub const KEY_DELIMITER: char = ',';

/// Prefix of the encoded form.
pub const KEY_PREFIX: &str = "bone@";

fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BoneError::invalid_payload(
            "bone_key",
            format!("{kind} name must not be empty"),
        ));
    }
    if name.contains(KEY_DELIMITER) {
        return Err(BoneError::invalid_payload(
            "bone_key",
            format!("{kind} name '{name}' contains the reserved '{KEY_DELIMITER}' delimiter"),
        ));
    }
    Ok(())
}

/// Identity of one attached model instance: `(entity, model)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    entity: Uuid,
    model: Arc<str>,
}

impl ModelKey {
    pub fn new(entity: Uuid, model: &str) -> Result<Self> {
        validate_name("model", model)?;
        Ok(Self {
            entity,
            model: Arc::from(model),
        })
    }

    #[inline]
    #[must_use]
    pub fn entity(&self) -> Uuid {
        self.entity
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extends this model key with a bone name.
    pub fn bone(&self, bone: &str) -> Result<BoneKey> {
        validate_name("bone", bone)?;
        Ok(BoneKey {
            model: self.clone(),
            bone: Arc::from(bone),
        })
    }
}

/// Identity of one bone: `(entity, model, bone)`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoneKey {
    model: ModelKey,
    bone: Arc<str>,
}

impl BoneKey {
    pub fn new(entity: Uuid, model: &str, bone: &str) -> Result<Self> {
        ModelKey::new(entity, model)?.bone(bone)
    }

    #[inline]
    #[must_use]
    pub fn entity(&self) -> Uuid {
        self.model.entity
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        self.model.model()
    }

    #[inline]
    #[must_use]
    pub fn bone(&self) -> &str {
        &self.bone
    }

    /// The `(entity, model)` prefix of this key.
    #[inline]
    #[must_use]
    pub fn model_key(&self) -> &ModelKey {
        &self.model
    }

    /// Returns `true` if this key belongs to the given model instance.
    #[inline]
    #[must_use]
    pub fn belongs_to(&self, model: &ModelKey) -> bool {
        self.model == *model
    }
}

impl fmt::Display for BoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{KEY_PREFIX}{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.entity(),
            self.model(),
            self.bone()
        )
    }
}

impl FromStr for BoneKey {
    type Err = BoneError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || {
            BoneError::invalid_payload(
                "bone_key",
                format!("'{s}' is not of the form {KEY_PREFIX}<uuid>,<model>,<bone>"),
            )
        };

        let body = s
            .get(..KEY_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(KEY_PREFIX))
            .map(|_| &s[KEY_PREFIX.len()..])
            .ok_or_else(malformed)?;

        let mut parts = body.splitn(3, KEY_DELIMITER);
        let (Some(entity), Some(model), Some(bone)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let entity = Uuid::parse_str(entity).map_err(|e| {
            BoneError::invalid_payload("bone_key", format!("bad entity id '{entity}': {e}"))
        })?;
        Self::new(entity, model, bone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_components_give_equal_keys() {
        let entity = Uuid::new_v4();
        let a = BoneKey::new(entity, "robot", "head").unwrap();
        let b = BoneKey::new(entity, "robot", "head").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.model(), "robot");
        assert_eq!(a.bone(), "head");
    }

    #[test]
    fn delimiter_in_names_is_rejected() {
        let entity = Uuid::new_v4();
        assert!(BoneKey::new(entity, "ro,bot", "head").is_err());
        assert!(BoneKey::new(entity, "robot", "he,ad").is_err());
        assert!(BoneKey::new(entity, "", "head").is_err());
    }

    #[test]
    fn encoded_form_parses_back() {
        let entity = Uuid::new_v4();
        let key = BoneKey::new(entity, "robot", "right_arm").unwrap();
        let text = key.to_string();
        assert_eq!(text, format!("bone@{entity},robot,right_arm"));
        assert_eq!(text.parse::<BoneKey>().unwrap(), key);
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!("robot,head".parse::<BoneKey>().is_err());
        assert!("bone@not-a-uuid,robot,head".parse::<BoneKey>().is_err());
        assert!(format!("bone@{},robot", Uuid::new_v4()).parse::<BoneKey>().is_err());
    }

    #[test]
    fn belongs_to_compares_model_prefix() {
        let entity = Uuid::new_v4();
        let key = BoneKey::new(entity, "robot", "head").unwrap();
        assert!(key.belongs_to(&ModelKey::new(entity, "robot").unwrap()));
        assert!(!key.belongs_to(&ModelKey::new(entity, "car").unwrap()));
        assert!(!key.belongs_to(&ModelKey::new(Uuid::new_v4(), "robot").unwrap()));
    }
}
