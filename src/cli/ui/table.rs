use crate::cli::{output, ui::style::UiStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Declarative description of a table column.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: String,
    pub width: usize,
    pub align: Align,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, width: usize) -> Self {
        Self {
            header: header.into(),
            width,
            align: Align::Left,
        }
    }

    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    fn pad(&self, cell: &str) -> String {
        let cell = fit(cell, self.width);
        match self.align {
            Align::Left => format!("{:<width$}", cell, width = self.width),
            Align::Right => format!("{:>width$}", cell, width = self.width),
        }
    }
}

/// Simple table model used for rendering read-only overviews.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: Option<String>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<T: Into<String>>(title: Option<T>, columns: Vec<TableColumn>) -> Self {
        Self {
            title: title.map(|value| value.into()),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        self.rows
            .push(cells.into_iter().map(|value| value.into()).collect());
    }
}

/// Renders [`Table`] instances using padded columns.
pub struct TableRenderer;

impl TableRenderer {
    pub fn lines(table: &Table, style: &UiStyle) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(title) = &table.title {
            lines.push(style.header(title));
        }
        let total_width = table
            .columns
            .iter()
            .map(|col| col.width + 1)
            .sum::<usize>()
            .saturating_sub(1)
            .max(1);

        let header = table
            .columns
            .iter()
            .map(|col| col.pad(&col.header))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(style.header(header.trim_end()));
        lines.push(style.horizontal_line(total_width));

        for row in &table.rows {
            let line = table
                .columns
                .iter()
                .enumerate()
                .map(|(idx, column)| column.pad(row.get(idx).map(String::as_str).unwrap_or("")))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(line.trim_end().to_string());
        }
        lines
    }

    pub fn render(table: &Table, style: &UiStyle) {
        for line in Self::lines(table, style) {
            output::plain(line);
        }
    }
}

fn fit(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let mut cut: String = cell.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}
