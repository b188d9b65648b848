#!/usr/bin/env cargo
use plants_api::openapi::PlantsApiDoc;

fn main() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&PlantsApiDoc::openapi())?;
    println!("{}", json);
    Ok(())
}
