// Receipt numbering

/// `<reception_number>-<nn>`, `sequence` being the 1-based count of
/// payments and refunds recorded on the reception
pub fn receipt_number(reception_number: &str, sequence: u64) -> String {
    format!("{reception_number}-{sequence:02}")
}
