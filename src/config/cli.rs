use crate::domain::model::{Include, RenderOptions};
use crate::utils::error::Result;
use crate::utils::validation::{validate_identifier, validate_non_empty_string, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "passive-record")]
#[command(about = "Render passive records as XML documents")]
pub struct CliConfig {
    #[arg(long, help = "TOML file declaring record types")]
    pub schema: PathBuf,

    #[arg(long, help = "JSON record document to render")]
    pub input: PathBuf,

    #[arg(long, help = "Write the document here instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub root_tag: Option<String>,

    #[arg(long, help = "Omit the XML preamble")]
    pub skip_header: bool,

    #[arg(long, value_delimiter = ',', help = "`all` or a comma-separated list of associations")]
    pub include: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Options given on the command line. Flags left off stay unset so that
    /// configured defaults can fill them.
    pub fn render_options(&self) -> RenderOptions {
        let include = match self.include.as_slice() {
            [] => None,
            [all] if all == "all" => Some(Include::All),
            names => Some(Include::only(names.iter().cloned())),
        };

        RenderOptions {
            skip_header: self.skip_header.then_some(true),
            root_tag: self.root_tag.clone(),
            include,
            extra_methods: None,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(root_tag) = &self.root_tag {
            validate_non_empty_string("root_tag", root_tag)?;
        }
        if self.include.len() > 1 || self.include.first().is_some_and(|name| name != "all") {
            for name in &self.include {
                validate_identifier("include", name)?;
            }
        }
        Ok(())
    }
}
