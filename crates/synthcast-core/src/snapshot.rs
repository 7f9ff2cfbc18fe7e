//! Introspection snapshot of an engine's parameters and programs.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use synthcast_plugin::PluginInstance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedParameter {
    pub index: usize,
    pub name: String,
    pub value: f32,
}

/// `{parameters: {name: value}, indexedParameters: [{index, name, value}], presets: [name]}`
///
/// Both parameter views describe the same values. When two parameters share
/// a display name the map keeps the higher index; the array keeps both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSnapshot {
    pub parameters: BTreeMap<String, f32>,
    pub indexed_parameters: Vec<IndexedParameter>,
    pub presets: Vec<String>,
}

impl PluginSnapshot {
    pub fn capture(engine: &dyn PluginInstance) -> Self {
        let indexed_parameters: Vec<IndexedParameter> = (0..engine.parameter_count())
            .map(|index| IndexedParameter {
                index,
                name: engine.parameter_name(index),
                value: engine.get_parameter(index),
            })
            .collect();

        let parameters = indexed_parameters
            .iter()
            .map(|p| (p.name.clone(), p.value))
            .collect();

        let presets = (0..engine.program_count())
            .map(|index| engine.program_name(index))
            .collect();

        Self {
            parameters,
            indexed_parameters,
            presets,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthcast_plugin::{BuiltinKind, BuiltinSynth};

    #[test]
    fn test_capture_builtin() {
        let synth = BuiltinSynth::new(BuiltinKind::Poly);
        let snapshot = PluginSnapshot::capture(&synth);

        assert_eq!(snapshot.indexed_parameters.len(), synth.parameter_count());
        assert_eq!(snapshot.parameters.len(), synth.parameter_count());
        assert_eq!(snapshot.presets.len(), synth.program_count());
        assert_eq!(snapshot.presets[0], "Init");

        for p in &snapshot.indexed_parameters {
            assert_eq!(snapshot.parameters.get(&p.name), Some(&p.value));
        }
    }

    #[test]
    fn test_json_shape() {
        let synth = BuiltinSynth::new(BuiltinKind::Poly);
        let bytes = PluginSnapshot::capture(&synth).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(value["parameters"].is_object());
        assert!(value["presets"].is_array());
        let first = &value["indexedParameters"][0];
        assert_eq!(first["index"], 0);
        assert_eq!(first["name"], "Volume");
        assert!(first["value"].is_number());
    }
}
