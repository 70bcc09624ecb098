use crate::types::{OrderType, Pattern};

const MAX_WIDTH: f64 = 60.0;

/// Draws one raw roll cut by `pattern` as a three-line ASCII strip.
///
/// Pieces are laid out left to right in order-type order, each labelled with
/// its width; the unused remainder is filled with `.`.
pub fn render_roll(raw_width: u32, order_types: &[OrderType], pattern: &Pattern) -> String {
    let scale = MAX_WIDTH / raw_width as f64;
    let grid_w = (raw_width as f64 * scale).round() as usize;
    if grid_w == 0 {
        return String::new();
    }

    let mut row = vec![' '; grid_w + 1];
    row[0] = '|';
    row[grid_w] = '|';

    let mut offset = 0u64;
    for (order, &count) in order_types.iter().zip(pattern.counts()) {
        for _ in 0..count {
            let sx = (offset as f64 * scale).round() as usize;
            offset += order.width as u64;
            let ex = ((offset as f64 * scale).round() as usize).min(grid_w);
            row[ex] = '|';
            draw_label(&mut row, sx, ex, &order.width.to_string());
        }
    }

    let sx = (offset as f64 * scale).round() as usize;
    for cell in row.iter_mut().take(grid_w).skip(sx + 1) {
        *cell = '.';
    }

    let edge: String = std::iter::once('+')
        .chain(std::iter::repeat_n('-', grid_w.saturating_sub(1)))
        .chain(std::iter::once('+'))
        .collect();
    let mut result = String::new();
    result.push_str(&edge);
    result.push('\n');
    result.extend(row.iter());
    result.push('\n');
    result.push_str(&edge);
    result.push('\n');
    result
}

fn draw_label(row: &mut [char], sx: usize, ex: usize, label: &str) {
    let chars: Vec<char> = label.chars().collect();
    if ex <= sx + chars.len() {
        return;
    }
    let start = sx + 1 + (ex - sx - 1 - chars.len()) / 2;
    for (i, &ch) in chars.iter().enumerate() {
        row[start + i] = ch;
    }
}
