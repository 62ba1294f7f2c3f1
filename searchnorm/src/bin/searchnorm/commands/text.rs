use anyhow::Result;
use clap::Args;

use searchnorm::text_search_filter;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::report::FilterReport;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Free Text",
    commands: &[
        "searchnorm text 'red car' --fields title,desc   # Every word in at least one field",
        "searchnorm --output compact text 'red car'      # Fields from searchnorm.toml",
    ],
}];

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Free-text query
    pub q: String,

    /// Fields to search (defaults to [text] fields in searchnorm.toml)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

pub fn handle_text(args: TextArgs, ctx: &ProjectContext, output: &OutputManager) -> Result<()> {
    let fields = ctx.text_fields(&args.fields);
    if fields.is_empty() {
        output.error("No text fields given.");
        anyhow::bail!("Pass --fields or set [text] fields in searchnorm.toml");
    }

    let filter = text_search_filter(&args.q, &fields);
    if filter.is_empty() {
        output.info("Query has no words; the filter matches everything");
    }

    output.heading("Text Search");
    output.display(&FilterReport::new(filter))?;
    Ok(())
}
