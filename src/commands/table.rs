use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{input_rows, json_output, labeled};
use crate::ops;
use crate::SiteplanPlugin;

pub struct Table;

impl PluginCommand for Table {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan table"
    }

    fn description(&self) -> &str {
        "Flat keyword table: filter by intent, then stable-sort by one column"
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
            .named(
                "sort",
                SyntaxShape::String,
                "Sort key: keyword, volume, confidenceScore (default: volume)",
                Some('s'),
            )
            .named(
                "direction",
                SyntaxShape::String,
                "Sort direction: asc, desc (default: desc)",
                Some('d'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["sort", "filter", "keywords", "flat"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open classified.json | siteplan table --filter article --sort confidenceScore",
            description: "Article keywords, most confident first",
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
        let filter = call
            .get_flag::<String>("filter")?
            .unwrap_or_else(|| "all".into());
        let sort = call
            .get_flag::<String>("sort")?
            .unwrap_or_else(|| "volume".into());
        let direction = call
            .get_flag::<String>("direction")?
            .unwrap_or_else(|| "desc".into());
        let rows = ops::op_table(&input_rows(input), &filter, &sort, &direction)
            .map_err(|e| labeled(e, head))?;
        Ok(json_output(&rows, head))
    }
}
