use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type, Value};

use super::util::input_rows;
use crate::ops;
use crate::SiteplanPlugin;

pub struct Export;

impl PluginCommand for Export {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan export"
    }

    fn description(&self) -> &str {
        "Render classified keywords as CSV text"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::String)
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["csv", "download", "save"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open classified.json | siteplan export | save site-plan.csv",
            description: "Write the plan to a CSV file",
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
        let csv = ops::op_export_csv(&input_rows(input));
        Ok(PipelineData::Value(Value::string(csv, call.head), None))
    }
}
