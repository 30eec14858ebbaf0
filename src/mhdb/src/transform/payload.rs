//! JSON object payloads for create/update operations.
//!
//! A key that is absent leaves a field untouched; a key that is present with
//! `null` clears it (or is rejected when the field cannot be empty).

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;

use super::TransformError;
use crate::entity::EntityId;

/// How an optional field should change
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key not present; leave the field as is
    Absent,
    /// Key present with `null`
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// `None` when absent, `Some(None)` when cleared
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Clear => Some(None),
            Patch::Set(value) => Some(Some(value)),
        }
    }

    /// Write into a nullable field
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Clear => *target = None,
            Patch::Set(value) => *target = Some(value),
        }
    }
}

/// A create/update request body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
    /// Dotted prefix used in error messages for nested payloads
    prefix: String,
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            prefix: String::new(),
        }
    }
}

impl TryFrom<Value> for Payload {
    type Error = TransformError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self::from(fields)),
            _ => Err(TransformError::InvalidField {
                field: "payload".to_string(),
                reason: "expected a JSON object".to_string(),
            }),
        }
    }
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    fn nested_from(&self, key: &str, fields: Map<String, Value>) -> Self {
        Self {
            fields,
            prefix: self.path(key),
        }
    }

    /// Full dotted path of `key`, used to name fields in errors
    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn invalid(&self, key: &str, reason: impl Display) -> TransformError {
        TransformError::InvalidField {
            field: self.path(key),
            reason: reason.to_string(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Every key in `required` that is absent or null
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| self.fields.get(**key).is_none_or(Value::is_null))
            .map(|key| self.path(key))
            .collect()
    }

    /// Fail with every missing field at once
    pub fn require(&self, required: &[&str]) -> Result<(), TransformError> {
        let missing = self.missing(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TransformError::Validation { missing })
        }
    }

    /// Typed value; `None` when absent, an error when null or mistyped
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, TransformError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::Null) => Err(self.invalid(key, "must not be null")),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.invalid(key, e)),
        }
    }

    /// Typed value for a nullable field
    pub fn patch<T: DeserializeOwned>(&self, key: &str) -> Result<Patch<T>, TransformError> {
        match self.fields.get(key) {
            None => Ok(Patch::Absent),
            Some(Value::Null) => Ok(Patch::Clear),
            Some(value) => serde_json::from_value(value.clone())
                .map(Patch::Set)
                .map_err(|e| self.invalid(key, e)),
        }
    }

    pub fn string(&self, key: &str) -> Result<Option<String>, TransformError> {
        self.value(key)
    }

    /// A string parsed through `FromStr`, for game vocabulary values
    pub fn parsed<T>(&self, key: &str) -> Result<Option<T>, TransformError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.string(key)? {
            Some(raw) => raw.parse().map(Some).map_err(|e| self.invalid(key, e)),
            None => Ok(None),
        }
    }

    /// A nullable vocabulary value
    pub fn parsed_patch<T>(&self, key: &str) -> Result<Patch<T>, TransformError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.patch::<String>(key)? {
            Patch::Set(raw) => raw.parse().map(Patch::Set).map_err(|e| self.invalid(key, e)),
            Patch::Clear => Ok(Patch::Clear),
            Patch::Absent => Ok(Patch::Absent),
        }
    }

    /// A list of vocabulary values; `null` means an empty list
    pub fn parsed_list<T>(&self, key: &str) -> Result<Option<Vec<T>>, TransformError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = match self.patch::<Vec<String>>(key)? {
            Patch::Absent => return Ok(None),
            Patch::Clear => return Ok(Some(Vec::new())),
            Patch::Set(raw) => raw,
        };
        raw.iter()
            .map(|value| value.parse().map_err(|e| self.invalid(key, e)))
            .collect::<Result<Vec<T>, _>>()
            .map(Some)
    }

    /// An ID list; `null` means an empty list
    pub fn ids(&self, key: &str) -> Result<Option<Vec<EntityId>>, TransformError> {
        match self.patch(key)? {
            Patch::Absent => Ok(None),
            Patch::Clear => Ok(Some(Vec::new())),
            Patch::Set(ids) => Ok(Some(ids)),
        }
    }

    /// A nested object payload
    pub fn nested(&self, key: &str) -> Result<Patch<Payload>, TransformError> {
        match self.fields.get(key) {
            None => Ok(Patch::Absent),
            Some(Value::Null) => Ok(Patch::Clear),
            Some(Value::Object(fields)) => Ok(Patch::Set(self.nested_from(key, fields.clone()))),
            Some(_) => Err(self.invalid(key, "expected an object")),
        }
    }

    /// A list of object payloads; `null` means an empty list
    pub fn list(&self, key: &str) -> Result<Option<Vec<Payload>>, TransformError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(Vec::new())),
            Some(Value::Array(values)) => values
                .iter()
                .enumerate()
                .map(|(index, value)| match value {
                    Value::Object(fields) => {
                        Ok(self.nested_from(&format!("{}.{}", key, index), fields.clone()))
                    }
                    _ => Err(self.invalid(key, "expected an array of objects")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(self.invalid(key, "expected an array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WeaponType;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload::try_from(value).unwrap()
    }

    #[test]
    fn test_missing_lists_every_field() {
        let p = payload(json!({"name": "Potion", "rarity": null}));
        assert_eq!(p.missing(&["name", "rarity", "value"]), vec!["rarity", "value"]);

        let err = p.require(&["name", "rarity", "value"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: rarity, value");
    }

    #[test]
    fn test_absent_null_present() {
        let p = payload(json!({"description": null, "stun": 10}));
        assert_eq!(p.patch::<String>("name").unwrap(), Patch::Absent);
        assert_eq!(p.patch::<String>("description").unwrap(), Patch::Clear);
        assert_eq!(p.patch::<u32>("stun").unwrap(), Patch::Set(10));
    }

    #[test]
    fn test_value_rejects_null_and_wrong_type() {
        let p = payload(json!({"name": null, "rarity": "rare"}));
        assert!(matches!(
            p.string("name"),
            Err(TransformError::InvalidField { .. })
        ));
        assert!(matches!(
            p.value::<u8>("rarity"),
            Err(TransformError::InvalidField { .. })
        ));
        assert_eq!(p.value::<u8>("missing").unwrap(), None);
    }

    #[test]
    fn test_parsed_vocabulary() {
        let p = payload(json!({"type": "great-sword", "bad": "spear"}));
        assert_eq!(
            p.parsed::<WeaponType>("type").unwrap(),
            Some(WeaponType::GreatSword)
        );
        let err = p.parsed::<WeaponType>("bad").unwrap_err();
        assert!(err.to_string().contains("Invalid weapon type: spear"));
    }

    #[test]
    fn test_nested_paths_in_errors() {
        let p = payload(json!({"crafting": {"materials": [{"item": 1}, "oops"]}}));
        let Patch::Set(crafting) = p.nested("crafting").unwrap() else {
            panic!("expected nested payload");
        };
        let err = crafting.list("materials").unwrap_err();
        assert!(err.to_string().contains("crafting.materials"));

        let p = payload(json!({"bonus": {"ranks": [{"pieces": 2}]}}));
        let Patch::Set(bonus) = p.nested("bonus").unwrap() else {
            panic!("expected nested payload");
        };
        let ranks = bonus.list("ranks").unwrap().unwrap();
        assert_eq!(ranks[0].missing(&["skill"]), vec!["bonus.ranks.0.skill"]);
    }

    #[test]
    fn test_ids_null_is_empty() {
        let p = payload(json!({"items": null, "skills": [3, 1]}));
        assert_eq!(p.ids("items").unwrap(), Some(vec![]));
        assert_eq!(p.ids("skills").unwrap(), Some(vec![3, 1]));
        assert_eq!(p.ids("other").unwrap(), None);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Payload::try_from(json!([1, 2])).is_err());
    }
}
