use super::Context;
use crate::cli::{TemplatesArgs, TemplatesCommands};
use crate::error::Result;
use ot2protocols::core::io::templates::{LayeredTemplates, TemplateSource};
use ot2protocols::workflows::protocol::{ProtocolInfo, catalog};

pub async fn run(args: TemplatesArgs, ctx: &Context) -> Result<()> {
    let config = ctx.resolve_config(Default::default())?;
    let templates = LayeredTemplates::new(config.templates_dir);
    match args.command {
        TemplatesCommands::List => {
            for name in templates.names() {
                println!("{}", name);
            }
        }
        TemplatesCommands::Show { name } => {
            print!("{}", templates.load(&name)?);
        }
    }
    Ok(())
}

pub async fn protocols() -> Result<()> {
    print!("{}", render_catalog(&catalog()));
    Ok(())
}

pub fn render_catalog(entries: &[ProtocolInfo]) -> String {
    entries
        .iter()
        .map(|p| format!("{:<8} {}\n         {}\n", p.short_name, p.title, p.description))
        .collect()
}
