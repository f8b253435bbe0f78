use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{json_output, labeled};
use crate::ops;
use crate::SiteplanPlugin;

pub struct Results;

impl PluginCommand for Results {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan results"
    }

    fn description(&self) -> &str {
        "Show or clear the result set stored by `siteplan analyze --store`"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![(Type::Nothing, Type::Any)])
            .required("path", SyntaxShape::Filepath, "Path to the SQLite result store")
            .switch("info", "Show only the stored metadata, not the records", Some('i'))
            .switch("clear", "Delete the stored result set", Some('c'))
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["store", "sqlite", "saved", "clear"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: "siteplan results plan.db | get records | siteplan tree",
                description: "Rebuild the tree from the stored result set",
                result: None,
            },
            Example {
                example: "siteplan results plan.db --info",
                description: "When and from how many keywords the stored set was produced",
                result: None,
            },
            Example {
                example: "siteplan results plan.db --clear",
                description: "Forget the stored result set",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &SiteplanPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        _input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let path: String = call.req(0)?;
        let result = if call.has_flag("clear")? {
            ops::op_clear(&path)
        } else if call.has_flag("info")? {
            ops::op_info(&path)
        } else {
            ops::op_results(&path)
        };
        let value = result.map_err(|e| labeled(e, head))?;
        Ok(json_output(&value, head))
    }
}
