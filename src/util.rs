use unicode_width::UnicodeWidthStr;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Column at which `text` starts when centered in `width` cells
pub fn centered_offset(text: &str, width: u16) -> u16 {
    let text_width = text.width().min(width as usize) as u16;
    (width - text_width) / 2
}
