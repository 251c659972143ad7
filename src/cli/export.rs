use std::path::PathBuf;

use crate::cli::open_default_ledger;
use crate::error::Result;
use crate::ledger::list_all;

pub fn csv(output: &str) -> Result<()> {
    let conn = open_default_ledger()?;
    let rows = list_all(&conn)?;
    let path = PathBuf::from(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&path)?;
    crate::export::write_csv(file, &rows)?;
    println!("Exported {} transactions to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(feature = "pdf")]
fn default_pdf_path() -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    crate::settings::get_data_dir()
        .join("exports")
        .join(format!("extrato-{date}.pdf"))
}

#[cfg(feature = "pdf")]
pub fn pdf(year: Option<i32>, output: Option<String>) -> Result<()> {
    use crate::reports::{get_monthly, period_filter};
    use crate::settings::load_settings;

    let conn = open_default_ledger()?;
    let months = get_monthly(&conn, &period_filter(year, None)?)?;
    let bytes = crate::pdf::render_statement(&months, &load_settings().user_name)?;
    let path = output.map(PathBuf::from).unwrap_or_else(default_pdf_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}
