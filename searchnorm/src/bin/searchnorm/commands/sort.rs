use anyhow::Result;
use clap::Args;

use searchnorm::normalize_sort;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::report::SortReport;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Sort Keys",
    commands: &[
        "searchnorm sort -- -price,name             # Descending price, then name",
        "searchnorm sort name --locale de           # Multi-language fields use name.de",
        "SEARCHNORM_LOCALE=fr searchnorm sort name  # Locale from the environment",
    ],
}];

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Comma separated fields, '-' prefix for descending order
    #[arg(allow_hyphen_values = true)]
    pub sort: String,

    /// Locale for multi-language fields (defaults to [sort] locale)
    #[arg(long, env = "SEARCHNORM_LOCALE")]
    pub locale: Option<String>,
}

pub fn handle_sort(args: SortArgs, ctx: &ProjectContext, output: &OutputManager) -> Result<()> {
    let locale = args.locale.unwrap_or_else(|| ctx.config.sort.locale.clone());
    let spec = normalize_sort(&args.sort, &ctx.config.schema, &locale);

    if spec.is_empty() {
        output.warning("Sort string has no fields");
    }

    output.heading("Sort");
    output.key_value("Locale", &locale);
    output.display(&SortReport::new(spec))?;
    Ok(())
}
