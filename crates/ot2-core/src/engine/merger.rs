use super::error::EngineError;
use super::parameters::ParameterBlock;
use crate::core::io::templates::TemplateSource;
use crate::core::models::template::ProtocolTemplate;
use tracing::{debug, instrument};

/// Name of the variable the parameter block is assigned to in generated scripts.
pub const PARAMETERS_VARIABLE: &str = "PARAMETERS";

/// Loads `template_name` from `templates` and splices `block` into it.
#[instrument(skip(templates, block))]
pub fn merge(
    templates: &impl TemplateSource,
    template_name: &str,
    block: &ParameterBlock,
) -> Result<String, EngineError> {
    let text = templates.load(template_name)?;
    let template = ProtocolTemplate::parse(template_name, text)?;
    merge_template(&template, block)
}

/// Replaces the template's marker with a single `PARAMETERS = <block>`
/// assignment. Every other byte of the template is copied unchanged.
pub fn merge_template(
    template: &ProtocolTemplate,
    block: &ParameterBlock,
) -> Result<String, EngineError> {
    if let Some(key) = template.required_keys().find(|key| !block.contains_key(key)) {
        return Err(EngineError::MissingParameter {
            template: template.name().to_string(),
            key: key.to_string(),
        });
    }

    let assignment = format!("{} = {}", PARAMETERS_VARIABLE, block.serialized());
    let mut script =
        String::with_capacity(template.text().len() + assignment.len());
    script.push_str(template.prefix());
    script.push_str(&assignment);
    script.push_str(template.suffix());

    debug!(
        "Merged {} parameter(s) into template '{}' ({} bytes).",
        block.len(),
        template.name(),
        script.len()
    );
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::templates::BuiltinTemplates;
    use crate::core::models::template::PARAMETER_MARKER;
    use crate::core::models::value::ParamValue;
    use crate::engine::parameters::build;
    use std::collections::HashMap;

    struct MapTemplates(HashMap<&'static str, String>);

    impl TemplateSource for MapTemplates {
        fn load(&self, name: &str) -> Result<String, EngineError> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| EngineError::TemplateNotFound {
                    name: name.to_string(),
                })
        }
    }

    const BEFORE: &str = "# ot2:requires num_samples\nfrom opentrons import protocol_api\r\n\n";
    const AFTER: &str = "\nmetadata = {'apiLevel': '2.13'}\n\ndef run(ctx):\n    pass\n";

    fn templates() -> MapTemplates {
        let text = format!("{}{}{}", BEFORE, PARAMETER_MARKER, AFTER);
        MapTemplates(HashMap::from([("demo", text)]))
    }

    #[test]
    fn merge_leaves_non_parameter_text_byte_for_byte() {
        let block = build([("num_samples", ParamValue::from(3))]).unwrap();
        let script = merge(&templates(), "demo", &block).unwrap();

        assert!(script.starts_with(BEFORE));
        assert!(script.ends_with(AFTER));
        let middle = &script[BEFORE.len()..script.len() - AFTER.len()];
        assert_eq!(middle, r#"PARAMETERS = {"num_samples":3}"#);
    }

    #[test]
    fn merge_is_repeatable() {
        let block = build([("num_samples", ParamValue::from(3))]).unwrap();
        let first = merge(&templates(), "demo", &block).unwrap();
        let second = merge(&templates(), "demo", &block).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn merge_fails_when_required_key_is_absent() {
        let block = build([("other", ParamValue::from(1))]).unwrap();
        let err = merge(&templates(), "demo", &block).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingParameter { ref key, .. } if key == "num_samples"
        ));
    }

    #[test]
    fn merge_reports_unknown_template() {
        let block = build([("num_samples", ParamValue::from(3))]).unwrap();
        let err = merge(&templates(), "nope", &block).unwrap_err();
        assert!(matches!(err, EngineError::TemplateNotFound { .. }));
    }

    #[test]
    fn merge_reports_malformed_template() {
        let source = MapTemplates(HashMap::from([("broken", "print('no marker')\n".to_string())]));
        let block = build(Vec::<(String, ParamValue)>::new()).unwrap();
        let err = merge(&source, "broken", &block).unwrap_err();
        assert!(matches!(err, EngineError::TemplateMalformed { .. }));
    }

    #[test]
    fn merge_preserves_marker_indentation() {
        let template =
            ProtocolTemplate::parse("indented", format!("def f():\n    {}\n", PARAMETER_MARKER))
                .unwrap();
        let block = build([("x", ParamValue::from(1))]).unwrap();
        let script = merge_template(&template, &block).unwrap();
        assert_eq!(script, "def f():\n    PARAMETERS = {\"x\":1}\n");
    }

    #[test]
    fn builtin_labware_template_merges_with_empty_block() {
        let block = build(Vec::<(String, ParamValue)>::new()).unwrap();
        let script = merge(&BuiltinTemplates, "labware", &block).unwrap();
        assert!(script.contains("PARAMETERS = {}"));
        assert!(!script.contains(PARAMETER_MARKER));
    }
}
