use serde_yml::{Mapping, Value};

use crate::{
    error::{ControlError, DefinitionError},
    AttributeContext, Control,
};

/// Attribute values for named controls, in the order they were declared.
///
/// ```yaml
/// PlayButton:
///   IdleTexture: play.png
///   Text: Play
///   AlphaRate: 0.05
/// ```
#[derive(Default, Debug, Clone)]
pub struct ControlDefinitions {
    controls: Mapping,
}

impl ControlDefinitions {
    pub fn from_yaml(source: &str) -> Result<Self, DefinitionError> {
        let value: Value = serde_yml::from_str(source)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        match value {
            Value::Mapping(controls) => {
                for (name, attributes) in controls.iter() {
                    if !matches!(attributes, Value::Mapping(_) | Value::Null) {
                        return Err(DefinitionError::ControlNotAMapping(scalar_to_string(
                            name,
                        )
                        .unwrap_or_default()));
                    }
                }
                Ok(ControlDefinitions { controls })
            }
            Value::Null => Ok(ControlDefinitions::default()),
            _ => Err(DefinitionError::NotAMapping),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controls.get(name).is_some()
    }

    /// Key/value pairs declared for `name`, in file order.
    pub fn attributes(&self, name: &str) -> Vec<(String, String)> {
        let Some(Value::Mapping(attributes)) = self.controls.get(name) else {
            return Vec::new();
        };
        attributes
            .iter()
            .filter_map(|(key, value)| {
                let key = scalar_to_string(key)?;
                match scalar_to_string(value) {
                    Some(value) => Some((key, value)),
                    None => {
                        log::warn!("{name}.{key}: value is not a scalar, ignoring");
                        None
                    }
                }
            })
            .collect()
    }

    /// Applies every attribute declared for `name` to `control`.
    pub fn apply_to<C: Control + ?Sized>(
        &self,
        name: &str,
        control: &mut C,
        ctx: &mut AttributeContext<'_>,
    ) -> Result<(), ControlError> {
        if !self.contains(name) {
            log::debug!("no definition for control {name}");
        }
        for (key, value) in self.attributes(name) {
            control
                .apply_attribute(&key, &value, ctx)
                .map_err(|source| ControlError::Attribute {
                    control: name.to_owned(),
                    key,
                    source,
                })?;
        }
        Ok(())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
