use crate::acquisition::AcquisitionResult;
use crate::analysis::AspectRecord;

pub fn print_acquisition_summary(result: &AcquisitionResult) {
    println!("=== Acquisition Results ===");
    println!("Keyword: {}", result.keyword);
    println!("Images downloaded: {}", result.item_count);
    println!("Time spent: {:.2} seconds", result.elapsed_seconds);
    println!("Stopped by: {:?}", result.stop_reason);
    println!();
}

pub fn print_records(records: &[AspectRecord], limit: usize) {
    println!("| absolute_path | aspect_ratio | aspect_ratio_range |");
    println!("|---------------|--------------|--------------------|");

    for record in records.iter().take(limit) {
        let ratio = record
            .aspect_ratio
            .map(|r| format!("{:.3}", r))
            .unwrap_or_else(|| "-".to_string());
        println!("| {} | {} | {} |", record.absolute_path, ratio, record.aspect_ratio_range);
    }
}
