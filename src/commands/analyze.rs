use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{call_config, input_rows, input_text, json_output, labeled};
use crate::algo::classifier::response_rows;
use crate::error::SiteplanError;
use crate::ops::{self, ClassifierSource};
use crate::SiteplanPlugin;

pub struct Analyze;

impl PluginCommand for Analyze {
    type Plugin = SiteplanPlugin;

    fn name(&self) -> &str {
        "siteplan analyze"
    }

    fn description(&self) -> &str {
        "Classify a keyword batch and reattach input search volumes"
    }

    fn extra_description(&self) -> &str {
        "Input is a table of {term, volume} rows, a list of keyword strings, or pasted text. \
         The batch is rejected before classification when it is empty or over the configured \
         limit (100 by default). Classification runs once per call, through --classifier \
         (a command that reads the batch as JSON on stdin) or --response (a JSON file)."
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::List(Box::new(Type::String)), Type::table()),
                (Type::String, Type::table()),
            ])
            .named(
                "classifier",
                SyntaxShape::String,
                "Classifier command line; receives the batch as JSON on stdin",
                Some('c'),
            )
            .named(
                "response",
                SyntaxShape::Filepath,
                "JSON file with an already-produced classifier response",
                Some('r'),
            )
            .named(
                "store",
                SyntaxShape::Filepath,
                "SQLite file that receives the result set on success (cache builds)",
                None,
            )
            .named("config", SyntaxShape::Filepath, "Path to a JSON config file", None)
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["classify", "keywords", "seo", "intent", "cluster"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"siteplan parse --sample | siteplan analyze --classifier "python3 classify.py""#,
                description: "Classify the sample list with an external script",
                result: None,
            },
            Example {
                example: "open keywords.tsv --raw | siteplan analyze --response classified.json",
                description: "Reuse a saved classifier response",
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
        let config = call_config(call)?;
        let classifier: Option<String> = call.get_flag("classifier")?;
        let response: Option<String> = call.get_flag("response")?;
        let store: Option<String> = call.get_flag("store")?;

        let keywords = match input_text(&input) {
            Some(text) => match ops::op_parse(&text) {
                serde_json::Value::Array(rows) => rows,
                _ => Vec::new(),
            },
            None => input_rows(input),
        };

        let result = match (classifier, response) {
            (Some(line), _) => ops::op_analyze(
                &keywords,
                ClassifierSource::Command(&line),
                &config,
                store.as_deref(),
            ),
            (None, Some(path)) => read_response(&path).and_then(|response| {
                ops::op_analyze(
                    &keywords,
                    ClassifierSource::Precomputed(response_rows(&response)?),
                    &config,
                    store.as_deref(),
                )
            }),
            (None, None) => Err(SiteplanError::invalid(
                "analyze needs --classifier <command> or --response <file>",
            )),
        };

        let records = result.map_err(|e| labeled(e, head))?;
        Ok(json_output(&records, head))
    }
}

fn read_response(path: &str) -> crate::error::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|e| SiteplanError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}
