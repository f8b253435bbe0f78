use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{call_config, input_rows, json_output, labeled};
use crate::ops;
use crate::SiteplanPlugin;

pub struct Summary;

impl PluginCommand for Summary {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan summary"
    }

    fn description(&self) -> &str {
        "Overview counters (themes, pillars, pages, hubs) and the intent distribution"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::record())
            .named("config", SyntaxShape::Filepath, "Path to a JSON config file", None)
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["overview", "stats", "counts", "intent"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open classified.json | siteplan summary",
            description: "Architecture overview",
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
        let config = call_config(call)?;
        let summary =
            ops::op_summary(&input_rows(input), &config).map_err(|e| labeled(e, head))?;
        Ok(json_output(&summary, head))
    }
}
