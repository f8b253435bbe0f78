use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type, Value};

use super::util::{input_rows, json_output, labeled, nu_to_json};
use crate::ops;
use crate::SiteplanPlugin;

pub struct Reattach;

impl PluginCommand for Reattach {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan reattach"
    }

    fn description(&self) -> &str {
        "Overwrite classified record volumes with the matching input keyword volumes"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::table())
            .required(
                "keywords",
                SyntaxShape::Table(vec![]),
                "The {term, volume} input batch",
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["volume", "merge", "join"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open classified.json | siteplan reattach (siteplan parse --sample)",
            description: "Carry the sample volumes onto saved classifier output",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &SiteplanPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let keywords: Value = call.req(0)?;
        let keywords = match nu_to_json(&keywords) {
            serde_json::Value::Array(rows) => rows,
            other => vec![other],
        };
        let records =
            ops::op_reattach(&keywords, &input_rows(input)).map_err(|e| labeled(e, head))?;
        Ok(json_output(&records, head))
    }
}
