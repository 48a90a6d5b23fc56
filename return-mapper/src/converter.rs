//! Paired core/UI mappers for one template.

use std::fmt;
use std::str::FromStr;

use return_template::{infer_source_layout, MappingPath, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapper::StructuralMapper;

/// Which way a payload is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    CoreToUi,
    UiToCore,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::CoreToUi => "core-to-ui",
            Direction::UiToCore => "ui-to-core",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core-to-ui" => Ok(Direction::CoreToUi),
            "ui-to-core" => Ok(Direction::UiToCore),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Core to UI and UI to core mappers built from the same copy paths.
///
/// The UI side array positions come from the template schema. The core side
/// positions are inferred from the `sourceKey`s that sit under each UI array.
#[derive(Debug, Clone)]
pub struct Converter {
    template_type: String,
    core_to_ui: StructuralMapper,
    ui_to_core: StructuralMapper,
}

impl Converter {
    pub fn from_template(template: &Template) -> Self {
        let paths = template.copy_paths();
        let ui_layout = template.array_layout();
        let core_layout = infer_source_layout(paths, ui_layout);

        Self {
            template_type: template.template_type().to_string(),
            core_to_ui: StructuralMapper::from_template(template),
            ui_to_core: StructuralMapper::new(paths.iter().map(MappingPath::swapped).collect())
                .with_destination_layout(core_layout),
        }
    }

    pub fn template_type(&self) -> &str {
        &self.template_type
    }

    pub fn core_to_ui(&self, core: &Value) -> Value {
        self.core_to_ui.apply(core)
    }

    pub fn ui_to_core(&self, ui: &Value) -> Value {
        self.ui_to_core.apply(ui)
    }

    pub fn convert(&self, direction: Direction, data: &Value) -> Value {
        self.mapper(direction).apply(data)
    }

    pub fn mapper(&self, direction: Direction) -> &StructuralMapper {
        match direction {
            Direction::CoreToUi => &self.core_to_ui,
            Direction::UiToCore => &self.ui_to_core,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cats_template() -> Template {
        Template::from_document(
            "cats",
            json!({
                "type": "object",
                "properties": {
                    "noise": { "type": "string", "sourceKey": ["cats"] },
                    "parents": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "breed": { "type": "string", "sourceKey": ["breed"] } }
                        }
                    }
                }
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_directions_are_inverse_paths() {
        let converter = Converter::from_template(&cats_template());

        let forward = converter.mapper(Direction::CoreToUi).paths();
        let backward = converter.mapper(Direction::UiToCore).paths();
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(backward) {
            assert_eq!(f, &b.swapped());
        }
    }

    #[test]
    fn test_parallel_core_arrays_round_trip() {
        let converter = Converter::from_template(&cats_template());
        let core = json!({ "cats": "meow", "breed": ["Tabby", "Siamese"] });

        let ui = converter.core_to_ui(&core);
        assert_eq!(
            ui,
            json!({ "noise": "meow", "parents": [{ "breed": "Tabby" }, { "breed": "Siamese" }] })
        );
        assert_eq!(converter.ui_to_core(&ui), core);
    }

    #[test]
    fn test_ui_array_sourced_from_core_object_returns_as_array() {
        let template = Template::from_document(
            "summary",
            json!({
                "type": "object",
                "properties": {
                    "list": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "a": { "sourceKey": ["summary", "a"] },
                                "b": { "sourceKey": ["summary", "b"] }
                            }
                        }
                    }
                }
            }),
        )
        .unwrap();
        let converter = Converter::from_template(&template);

        let ui = converter.core_to_ui(&json!({ "summary": { "a": 1, "b": 2 } }));
        assert_eq!(ui, json!({ "list": [{ "a": 1, "b": 2 }] }));

        // the schema does not say `summary` is an object, so it is read back as the array leg
        assert_eq!(
            converter.ui_to_core(&ui),
            json!({ "summary": [{ "a": 1, "b": 2 }] })
        );
    }

    #[test]
    fn test_convert_dispatches_on_direction() {
        let converter = Converter::from_template(&cats_template());
        assert_eq!(
            converter.convert(Direction::CoreToUi, &json!({ "cats": "purr" })),
            json!({ "noise": "purr" })
        );
        assert_eq!(
            converter.convert(Direction::UiToCore, &json!({ "noise": "purr" })),
            json!({ "cats": "purr" })
        );
    }

    #[test]
    fn test_direction_names() {
        assert_eq!("core-to-ui".parse::<Direction>().unwrap(), Direction::CoreToUi);
        assert_eq!(Direction::UiToCore.to_string(), "ui-to-core");
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(serde_json::to_value(Direction::UiToCore).unwrap(), json!("ui-to-core"));
    }
}
