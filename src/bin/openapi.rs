use anyhow::Result;

// Print the OpenAPI document for the login and health endpoints
fn main() -> Result<()> {
    let doc = wuzzlmoasta::api::openapi();
    println!("{}", doc.to_pretty_json()?);
    Ok(())
}
