use roombook_core::error::RoombookError;
use roombook_core::extraction::pdftotext::PdftotextExtractor;

pub fn run() -> Result<(), RoombookError> {
    if !PdftotextExtractor::is_available() {
        return Err(RoombookError::PdftotextNotFound);
    }
    match PdftotextExtractor::version() {
        Some(version) => println!("pdftotext available: {version}"),
        None => println!("pdftotext available"),
    }
    Ok(())
}
