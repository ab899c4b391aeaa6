use roombook_core::config::PipelineConfig;
use roombook_core::error::RoombookError;

pub fn run() -> Result<(), RoombookError> {
    let config = PipelineConfig::builtin()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
