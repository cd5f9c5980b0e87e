//! Plain-text table rendering for resource listings.
//!
//! Presentation glue only: column widths from content, two-space gutters,
//! no wrapping. Anything smarter belongs in a real presentation layer.

use cumulo_core::domain::{Application, Database, Environment, Tag};

/// Render one padded table to a string (trailing newline included).
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    push_row(&mut out, &widths, headers.iter().map(|h| h.to_string()));
    push_row(
        &mut out,
        &widths,
        widths.iter().map(|w| "-".repeat(*w)),
    );
    for row in rows {
        push_row(&mut out, &widths, row.iter().cloned());
    }
    out
}

fn push_row(out: &mut String, widths: &[usize], cells: impl Iterator<Item = String>) {
    let rendered: Vec<String> = cells
        .enumerate()
        .map(|(i, cell)| {
            let width = widths.get(i).copied().unwrap_or(0);
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(rendered.join("  ").trim_end());
    out.push('\n');
}

pub fn applications(apps: &[Application]) -> String {
    let rows: Vec<Vec<String>> = apps
        .iter()
        .map(|a| vec![a.name.clone(), a.uuid.clone(), a.hosting_id.clone()])
        .collect();
    table(&["Name", "UUID", "Hosting ID"], &rows)
}

pub fn environments(envs: &[Environment], db_names: &[String]) -> String {
    let rows: Vec<Vec<String>> = envs
        .iter()
        .map(|e| {
            vec![
                environment_label(e),
                e.uuid.clone(),
                e.vcs_path.clone(),
                e.domains.join(", "),
                db_names.join(", "),
            ]
        })
        .collect();
    table(
        &["Environment", "ID", "Branch/Tag", "Domain(s)", "Database(s)"],
        &rows,
    )
}

/// "Label (name)", decorated with the livedev / production-mode markers.
pub fn environment_label(env: &Environment) -> String {
    let mut label = format!("{} ({})", env.label, env.name);
    if env.flags.livedev {
        label = format!("💻  {label}");
    }
    if env.flags.production_mode {
        label = format!("🔒  {label}");
    }
    label
}

pub fn databases(dbs: &[Database]) -> String {
    let rows: Vec<Vec<String>> = dbs.iter().map(|d| vec![d.name.clone()]).collect();
    table(&["Name"], &rows)
}

pub fn tags(tags: &[Tag]) -> String {
    let rows: Vec<Vec<String>> = tags
        .iter()
        .map(|t| vec![t.name.clone(), t.color.clone()])
        .collect();
    table(&["Name", "Color"], &rows)
}
