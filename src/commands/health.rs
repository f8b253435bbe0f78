use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{call_config, input_rows, json_output, labeled};
use crate::ops;
use crate::SiteplanPlugin;

pub struct Health;

impl PluginCommand for Health {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan health"
    }

    fn description(&self) -> &str {
        "Cluster health per theme, from its count of distinct pages"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::table())
            .named(
                "filter",
                SyntaxShape::String,
                "Intent filter: all, product, collection, article, unknown (default: all)",
                Some('f'),
            )
            .named("config", SyntaxShape::Filepath, "Path to a JSON config file", None)
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["cluster", "strength", "coverage", "theme"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open classified.json | siteplan health | where health == weak",
            description: "Themes that are merge candidates",
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
        let filter = call
            .get_flag::<String>("filter")?
            .unwrap_or_else(|| "all".into());
        let rows =
            ops::op_health(&input_rows(input), &filter, &config).map_err(|e| labeled(e, head))?;
        Ok(json_output(&rows, head))
    }
}
