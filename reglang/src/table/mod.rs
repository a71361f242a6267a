/// Renders rows of cells as space-padded, aligned columns. Each column is
/// as wide as its widest cell (measured in characters, since state arrows
/// and term labels are not ASCII-only).
#[derive(Default, Debug, Clone)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self, sep: &str) -> String {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            if widths.len() < row.len() {
                widths.resize(row.len(), 0);
            }
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for (line, row) in self.rows.iter().enumerate() {
            if line > 0 {
                out.push('\n');
            }
            for (cell, &width) in row.iter().zip(&widths) {
                out.push_str(cell);
                for _ in cell.chars().count()..width {
                    out.push(' ');
                }
                out.push_str(sep);
            }
        }
        out
    }
}
