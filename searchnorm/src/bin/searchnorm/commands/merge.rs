use anyhow::{Context, Result};
use clap::Args;

use searchnorm::{FieldPath, Value, parse_document};

use super::IdScheme;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::report::DocumentReport;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Field-Scoped Merge",
    commands: &[
        r#"searchnorm merge --fields a,b '{"a":1,"c":9}' '{"b":2,"c":8}'"#,
        r#"searchnorm merge --fields meta.title '{"meta":{"title":"a"}}' '{"meta":{"title":"b"}}'"#,
    ],
}];

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Field paths kept in the result (dotted paths allowed)
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Base document (JSON object)
    pub object: String,

    /// Document merged over the base (JSON object)
    pub source: String,

    /// Identifier format treated as opaque during the merge
    #[arg(long, value_enum, default_value = "object-id")]
    pub ids: IdScheme,
}

pub fn handle_merge(args: MergeArgs, output: &OutputManager) -> Result<()> {
    let object = parse_document(&args.object).context("Failed to parse object document")?;
    let source = parse_document(&args.source).context("Failed to parse source document")?;
    let fields = FieldPath::parse_list(&args.fields);

    let merged = args.ids.merge(&fields, &Value::Object(object), &Value::Object(source));

    output.heading("Merged Document");
    output.display(&DocumentReport::new(&merged))?;
    Ok(())
}
