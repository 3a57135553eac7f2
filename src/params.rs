use serde::Serialize;

use crate::error::{Result, SceneError};

/// A single tunable value addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Flag(bool),
    /// Linear RGB, each channel in [0, 1].
    Color([f32; 3]),
    Choice(String),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Flag(_) => "flag",
            ParamValue::Color(_) => "color",
            ParamValue::Choice(_) => "choice",
        }
    }
}

/// Valid range/domain declared at registration time. The store validates
/// writes against it; the panel widget additionally clamps input.
#[derive(Debug, Clone, Serialize)]
pub enum Domain {
    Range { min: f64, max: f64, step: f64 },
    Choices(Vec<String>),
    Flag,
    Color,
}

impl Domain {
    fn admits(&self, value: &ParamValue) -> std::result::Result<(), String> {
        match (self, value) {
            (Domain::Range { min, max, .. }, ParamValue::Number(n)) => {
                if !n.is_finite() {
                    Err(format!("{n} is not finite"))
                } else if n < min || n > max {
                    Err(format!("{n} outside [{min}, {max}]"))
                } else {
                    Ok(())
                }
            }
            (Domain::Choices(choices), ParamValue::Choice(c)) => {
                if choices.iter().any(|x| x == c) {
                    Ok(())
                } else {
                    Err(format!("'{c}' not one of {choices:?}"))
                }
            }
            (Domain::Flag, ParamValue::Flag(_)) => Ok(()),
            (Domain::Color, ParamValue::Color(c)) => {
                if c.iter().all(|ch| (0.0..=1.0).contains(ch)) {
                    Ok(())
                } else {
                    Err(format!("{c:?} has channels outside [0, 1]"))
                }
            }
            (_, v) => Err(format!("expected {}, got {}", self.expected(), v.type_name())),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Domain::Range { .. } => "number",
            Domain::Choices(_) => "choice",
            Domain::Flag => "flag",
            Domain::Color => "color",
        }
    }
}

/// How a parameter change propagates to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass {
    /// Mutates an existing property in place (color, roughness, intensity).
    Continuous,
    /// Requires regenerating a derived resource (segment counts, radius,
    /// wireframe pipeline, env-map binding).
    Structural,
}

/// One registered field: current value plus its declared domain.
#[derive(Debug, Clone)]
pub struct ParamEntry {
    pub path: String,
    pub value: ParamValue,
    pub domain: Domain,
    pub class: ParamClass,
}

/// A validated edit reported back to the scene for routing.
#[derive(Debug, Clone)]
pub struct ParamChange {
    pub path: String,
    pub value: ParamValue,
    pub class: ParamClass,
}

/// Flat store of every tunable value for one demo, keyed by dotted path
/// ("sphere.radius"). Registration order is preserved so the control panel
/// lays out groups the way the descriptor declared them.
#[derive(Debug, Default)]
pub struct ParamStore {
    entries: Vec<ParamEntry>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field with its initial value and domain. The initial
    /// value must itself satisfy the domain.
    pub fn register(
        &mut self,
        path: &str,
        initial: ParamValue,
        domain: Domain,
        class: ParamClass,
    ) -> Result<()> {
        if self.entries.iter().any(|e| e.path == path) {
            return Err(SceneError::DuplicateParameter(path.to_string()));
        }
        domain
            .admits(&initial)
            .map_err(|reason| SceneError::InvalidParameterDomain {
                path: path.to_string(),
                reason,
            })?;
        self.entries.push(ParamEntry {
            path: path.to_string(),
            value: initial,
            domain,
            class,
        });
        Ok(())
    }

    /// Write a new value. Rejected writes leave the prior value in place.
    pub fn set(&mut self, path: &str, value: ParamValue) -> Result<ParamChange> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.path == path)
            .ok_or_else(|| SceneError::UnknownParameter(path.to_string()))?;
        entry
            .domain
            .admits(&value)
            .map_err(|reason| SceneError::InvalidParameterDomain {
                path: path.to_string(),
                reason,
            })?;
        entry.value = value.clone();
        Ok(ParamChange {
            path: path.to_string(),
            value,
            class: entry.class,
        })
    }

    pub fn get(&self, path: &str) -> Result<&ParamValue> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| &e.value)
            .ok_or_else(|| SceneError::UnknownParameter(path.to_string()))
    }

    /// Numeric getter; errors when the path is unknown or holds a
    /// non-numeric value.
    pub fn number(&self, path: &str) -> Result<f64> {
        match self.get(path)? {
            ParamValue::Number(n) => Ok(*n),
            other => Err(SceneError::InvalidParameterDomain {
                path: path.to_string(),
                reason: format!("expected number, found {}", other.type_name()),
            }),
        }
    }

    pub fn number_f32(&self, path: &str) -> Result<f32> {
        self.number(path).map(|n| n as f32)
    }

    pub fn flag(&self, path: &str) -> Result<bool> {
        match self.get(path)? {
            ParamValue::Flag(b) => Ok(*b),
            other => Err(SceneError::InvalidParameterDomain {
                path: path.to_string(),
                reason: format!("expected flag, found {}", other.type_name()),
            }),
        }
    }

    pub fn color(&self, path: &str) -> Result<[f32; 3]> {
        match self.get(path)? {
            ParamValue::Color(c) => Ok(*c),
            other => Err(SceneError::InvalidParameterDomain {
                path: path.to_string(),
                reason: format!("expected color, found {}", other.type_name()),
            }),
        }
    }

    pub fn choice(&self, path: &str) -> Result<&str> {
        match self.get(path)? {
            ParamValue::Choice(c) => Ok(c.as_str()),
            other => Err(SceneError::InvalidParameterDomain {
                path: path.to_string(),
                reason: format!("expected choice, found {}", other.type_name()),
            }),
        }
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[ParamEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [ParamEntry] {
        &mut self.entries
    }

    /// Group prefixes ("sphere", "material") in first-seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let prefix = entry.path.split('.').next().unwrap_or(&entry.path);
            if !groups.contains(&prefix) {
                groups.push(prefix);
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_radius() -> ParamStore {
        let mut store = ParamStore::new();
        store
            .register(
                "sphere.radius",
                ParamValue::Number(0.5),
                Domain::Range {
                    min: 0.0,
                    max: 5.0,
                    step: 0.01,
                },
                ParamClass::Structural,
            )
            .unwrap();
        store
    }

    #[test]
    fn register_and_read_back() {
        let store = store_with_radius();
        assert_eq!(store.number("sphere.radius").unwrap(), 0.5);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut store = store_with_radius();
        let err = store.register(
            "sphere.radius",
            ParamValue::Number(1.0),
            Domain::Range {
                min: 0.0,
                max: 5.0,
                step: 0.01,
            },
            ParamClass::Structural,
        );
        assert!(matches!(err, Err(SceneError::DuplicateParameter(_))));
    }

    #[test]
    fn in_range_write_applies() {
        let mut store = store_with_radius();
        let change = store.set("sphere.radius", ParamValue::Number(1.2)).unwrap();
        assert_eq!(change.class, ParamClass::Structural);
        assert_eq!(store.number("sphere.radius").unwrap(), 1.2);
    }

    #[test]
    fn out_of_domain_write_keeps_prior_value() {
        let mut store = store_with_radius();
        let err = store.set("sphere.radius", ParamValue::Number(-1.0));
        assert!(matches!(
            err,
            Err(SceneError::InvalidParameterDomain { .. })
        ));
        assert_eq!(store.number("sphere.radius").unwrap(), 0.5);
    }

    #[test]
    fn type_mismatch_rejected() {
        let mut store = store_with_radius();
        let err = store.set("sphere.radius", ParamValue::Flag(true));
        assert!(matches!(
            err,
            Err(SceneError::InvalidParameterDomain { .. })
        ));
        assert_eq!(store.number("sphere.radius").unwrap(), 0.5);
    }

    #[test]
    fn non_finite_write_rejected() {
        let mut store = store_with_radius();
        assert!(store
            .set("sphere.radius", ParamValue::Number(f64::NAN))
            .is_err());
        assert_eq!(store.number("sphere.radius").unwrap(), 0.5);
    }

    #[test]
    fn choice_domain_enforced() {
        let mut store = ParamStore::new();
        store
            .register(
                "material.env_map",
                ParamValue::Choice("0".into()),
                Domain::Choices(vec!["0".into(), "1".into(), "2".into()]),
                ParamClass::Structural,
            )
            .unwrap();

        assert!(store
            .set("material.env_map", ParamValue::Choice("2".into()))
            .is_ok());
        assert!(store
            .set("material.env_map", ParamValue::Choice("7".into()))
            .is_err());
        assert_eq!(store.choice("material.env_map").unwrap(), "2");
    }

    #[test]
    fn color_channels_validated() {
        let mut store = ParamStore::new();
        store
            .register(
                "material.color",
                ParamValue::Color([1.0, 1.0, 1.0]),
                Domain::Color,
                ParamClass::Continuous,
            )
            .unwrap();
        assert!(store
            .set("material.color", ParamValue::Color([0.2, 0.4, 0.6]))
            .is_ok());
        assert!(store
            .set("material.color", ParamValue::Color([1.5, 0.0, 0.0]))
            .is_err());
        assert_eq!(store.color("material.color").unwrap(), [0.2, 0.4, 0.6]);
    }

    #[test]
    fn unknown_path_errors() {
        let store = ParamStore::new();
        assert!(matches!(
            store.get("nope.nothing"),
            Err(SceneError::UnknownParameter(_))
        ));
    }

    #[test]
    fn groups_in_registration_order() {
        let mut store = ParamStore::new();
        for (path, value) in [
            ("torus.radius", 0.45),
            ("torus.tube", 0.24),
            ("sphere.radius", 0.5),
        ] {
            store
                .register(
                    path,
                    ParamValue::Number(value),
                    Domain::Range {
                        min: 0.0,
                        max: 5.0,
                        step: 0.01,
                    },
                    ParamClass::Structural,
                )
                .unwrap();
        }
        assert_eq!(store.groups(), vec!["torus", "sphere"]);
    }
}
