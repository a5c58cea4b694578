use std::path::Path;

use engine_tera::RenderEngine;
use miette::Result;

use super::{build_engine, render_options};
use crate::cli::CommonArgs;

pub fn run(path: String, common: CommonArgs) -> Result<()> {
    let engine = build_engine(&common, Path::new("./templates"))?;
    let rendered = engine.render_file(&path, Some(&render_options(&common.data)))?;
    print!("{}", rendered.content);
    Ok(())
}
