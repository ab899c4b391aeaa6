use roombook_core::error::RoombookError;
use roombook_core::model::RoomReport;
use roombook_core::RunSummary;

pub fn print_report(report: &RoomReport) -> Result<(), RoombookError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

pub fn print_summary(summary: &RunSummary) -> Result<(), RoombookError> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{json}");
    Ok(())
}
