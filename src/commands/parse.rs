use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type};

use super::util::{input_text, json_output};
use crate::ops;
use crate::SiteplanPlugin;

pub struct Parse;

impl PluginCommand for Parse {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan parse"
    }

    fn description(&self) -> &str {
        "Parse pasted keyword text (keyword<TAB or comma>volume per line) into a table"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::String, Type::table()),
                (Type::Nothing, Type::table()),
            ])
            .switch("sample", "Parse the bundled sample keyword list", Some('s'))
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["keywords", "tsv", "csv", "volume", "paste"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"open keywords.tsv --raw | siteplan parse"#,
                description: "Parse a spreadsheet export",
                result: None,
            },
            Example {
                example: "siteplan parse --sample",
                description: "Load the bundled sample list",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &SiteplanPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let parsed = if call.has_flag("sample")? {
            ops::op_sample()
        } else {
            let text = input_text(&input).ok_or_else(|| {
                LabeledError::new("expected pasted keyword text as a string")
                    .with_label("pipe a string into this command", head)
            })?;
            ops::op_parse(&text)
        };
        Ok(json_output(&parsed, head))
    }
}
