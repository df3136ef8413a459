use wallet_dashboard_core::models::asset::WalletAsset;
use wallet_dashboard_core::models::dashboard::DashboardView;

/// Left-aligned plain-text table; column widths fit the widest cell.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        padded.join("  ").trim_end().to_string() + "\n"
    };

    let mut out = line(headers.to_vec());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

pub fn wallet_table(view: &DashboardView, with_assets: bool) -> String {
    let rows: Vec<Vec<String>> = view
        .wallets
        .iter()
        .map(|w| {
            vec![
                w.id.clone(),
                w.name.clone(),
                w.display_sum(),
                w.created_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    let mut out = table(&["ID", "NAME", "SUM", "CREATED"], &rows);

    if with_assets {
        for wallet in view.wallets.iter().filter(|w| w.assets_loaded()) {
            out.push_str(&format!("\n{} ({})\n", wallet.name, wallet.id));
            out.push_str(&asset_table(wallet.assets()));
        }
    }
    out
}

pub fn asset_table(assets: &[WalletAsset]) -> String {
    if assets.is_empty() {
        return "(no assets)\n".to_string();
    }
    let rows: Vec<Vec<String>> = assets
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.identifier.clone(),
                a.name.clone(),
                a.kind().map(|k| k.to_string()).unwrap_or_else(|| a.asset.clone()),
                a.class.clone(),
                a.custody.clone(),
                a.display_total(),
                a.display_yield(),
                a.acquired.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["ID", "IDENTIFIER", "NAME", "TYPE", "CLASS", "CUSTODY", "TOTAL", "YIELD", "ACQUIRED"],
        &rows,
    )
}
