use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{call_config, input_rows, json_output, labeled};
use crate::ops;
use crate::SiteplanPlugin;

pub struct Tree;

impl PluginCommand for Tree {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan tree"
    }

    fn description(&self) -> &str {
        "Build the Theme > Pillar > Page site tree from classified keywords"
    }

    fn extra_description(&self) -> &str {
        "Themes are ordered by total search volume and pages by their primary keyword's \
         volume, both descending with ties in input order. Synonyms are folded under their \
         canonical page. Each theme carries a cluster health label."
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::record())
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
        vec!["hierarchy", "architecture", "theme", "pillar", "page"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open classified.json | siteplan tree --filter product",
            description: "Site tree restricted to product-intent keywords",
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
        let tree =
            ops::op_tree(&input_rows(input), &filter, &config).map_err(|e| labeled(e, head))?;
        Ok(json_output(&tree, head))
    }
}
