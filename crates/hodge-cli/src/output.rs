use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render the feature listings (`id list`, `status`) as aligned columns.
pub fn print_columns(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_columns(headers, rows));
}

fn render_columns(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(widths.len()).enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = String::new();
    out.push_str(&render_row(&header, &widths));
    out.push_str(&render_row(&rule, &widths));
    for row in rows {
        out.push_str(&render_row(row, &widths));
    }
    out
}

/// One padded line; trailing padding after the last cell is dropped so
/// short final columns (empty KIND, empty EXTERNAL) leave no stray spaces.
fn render_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let rows = vec![
            vec!["HODGE-001".to_string(), "exploring".to_string()],
            vec!["HODGE-002.1".to_string(), "shipped".to_string()],
        ];
        let out = render_columns(&["FEATURE", "STATUS"], &rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "FEATURE      STATUS");
        assert_eq!(lines[1], "-----------  ------");
        assert_eq!(lines[2], "HODGE-001    exploring");
        assert_eq!(lines[3], "HODGE-002.1  shipped");
    }

    #[test]
    fn rows_carry_no_trailing_padding() {
        let rows = vec![vec!["HODGE-001".to_string(), String::new()]];
        let out = render_columns(&["LOCAL", "EXTERNAL"], &rows);
        for line in out.lines() {
            assert_eq!(line, line.trim_end());
        }
    }
}
