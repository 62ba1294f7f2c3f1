use anyhow::{Context, Result};
use clap::Args;

use searchnorm::{Conditions, NormalizeOptions, SearchNormalizer, add_text_search_to_query};

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::report::FilterReport;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Normalize Parameters",
        commands: &[
            "searchnorm search 'status=true&age=18-25'            # Typed values and ranges",
            "searchnorm search 'age=18-25,30-40&price=1-5,6-9'    # Range lists become $or branches",
            "searchnorm search 'name|title=bob' --match-from-start # Aliased fields, anchored pattern",
        ],
    },
    ExampleGroup {
        title: "With Free Text",
        commands: &[
            "searchnorm search 'status=true' --q 'red car' --fields title,desc",
            "searchnorm --output json search 'owner=5f1d7a2b9c3e4f5a6b7c8d9e'",
        ],
    },
];

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// URL query string holding the raw search parameters
    pub query: String,

    /// Keep unmatched strings as exact values instead of partial-match patterns
    #[arg(long)]
    pub no_regex: bool,

    /// Anchor partial-match patterns to the start of the value
    #[arg(long)]
    pub match_from_start: bool,

    /// Free-text query to attach to the filter
    #[arg(long = "q", value_name = "TEXT")]
    pub text: Option<String>,

    /// Fields searched by --q (defaults to [text] fields in searchnorm.toml)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

pub fn handle_search(args: SearchArgs, ctx: &ProjectContext, output: &OutputManager) -> Result<()> {
    let configured = ctx.config.normalize;
    let options = NormalizeOptions::new()
        .with_no_regex(args.no_regex || configured.no_regex)
        .with_match_from_start(args.match_from_start || configured.match_from_start);

    let params = Conditions::from_query_string(&args.query);
    output.verbose(&format!("Parsed {} parameters", params.len()));

    let mut filter = SearchNormalizer::new()
        .with_options(options)
        .normalize(&params)
        .with_context(|| format!("Failed to normalize '{}'", args.query))?;

    if let Some(q) = args.text.as_deref() {
        let fields = ctx.text_fields(&args.fields);
        if fields.is_empty() {
            output.warning("No text fields given; ignoring --q. Pass --fields or set [text] fields.");
        } else {
            add_text_search_to_query(&mut filter, q, &fields);
            output.verbose(&format!("Attached text search over {}", fields.join(", ")));
        }
    }

    output.heading("Filter");
    output.display(&FilterReport::new(filter))?;
    Ok(())
}
