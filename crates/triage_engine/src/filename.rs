/// Fixed attachment name the service uses for the PDF report.
pub fn pdf_filename() -> &'static str {
    "relatorio_agrupamentos_oci.pdf"
}

/// Attachment name of the input template spreadsheet.
pub fn template_filename() -> &'static str {
    "arquivo_modelo.xlsx"
}

/// Timestamped to avoid collisions between successive exports.
pub fn xlsx_filename(timestamp: &str) -> String {
    format!("relatorio_oci_{}.xlsx", sanitize_stamp(timestamp))
}

fn sanitize_stamp(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '-' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['-', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "export".to_string();
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | '\0'..='\u{1F}'
    )
}

#[cfg(test)]
mod tests {
    use super::xlsx_filename;

    #[test]
    fn xlsx_name_embeds_timestamp() {
        assert_eq!(
            xlsx_filename("20260806_101530"),
            "relatorio_oci_20260806_101530.xlsx"
        );
    }

    #[test]
    fn iso_stamp_is_made_filesystem_safe() {
        assert_eq!(
            xlsx_filename("2026-08-06T10:15:30"),
            "relatorio_oci_2026-08-06T10-15-30.xlsx"
        );
    }

    #[test]
    fn degenerate_stamp_falls_back() {
        assert_eq!(xlsx_filename("::"), "relatorio_oci_export.xlsx");
    }
}
