/// Download name for a composed document: `report.PDF` becomes
/// `report-manipulated.pdf`.
pub fn output_file_name(name: &str) -> String {
    let stem = strip_pdf_extension(name);
    format!("{}-manipulated.pdf", stem)
}

fn strip_pdf_extension(name: &str) -> &str {
    const EXT: &str = ".pdf";
    let Some(split) = name.len().checked_sub(EXT.len()) else {
        return name;
    };
    if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(EXT) {
        &name[..split]
    } else {
        name
    }
}

/// Human readable size: kilobytes with one decimal below 1024 KB, megabytes
/// with two decimals otherwise.
pub fn format_file_size(bytes: usize) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{:.1} KB", kb)
    } else {
        format!("{:.2} MB", kb / 1024.0)
    }
}
