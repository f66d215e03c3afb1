use miette::Result;
use modpath_core::{version_string, OUTPUT_SCHEMA_VERSION, VERSION};

pub fn run(json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "name": "modpath",
                "version": VERSION,
                "schema_version": OUTPUT_SCHEMA_VERSION,
            })
        );
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
