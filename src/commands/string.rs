use std::path::Path;

use engine_tera::RenderEngine;
use miette::Result;

use super::{build_engine, render_options};
use crate::cli::CommonArgs;

pub fn run(template: String, common: CommonArgs) -> Result<()> {
    // String templates never read from the root, but the engine still needs one.
    let engine = build_engine(&common, Path::new("."))?;
    let rendered = engine.render(&template, Some(&render_options(&common.data)))?;
    println!("{}", rendered.content);
    Ok(())
}
