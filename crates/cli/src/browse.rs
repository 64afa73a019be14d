use anyhow::Result;
use layerdeck_client::{
    CatalogApi, CatalogBrowser, DetailState, FetchOptions, RowView, RowVisibility,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str =
    "commands: search <text> | clear | rows | toggle <id> | delete <id> | refresh | quit";

/// Line-oriented browsing session over stdin. Fetches run in the background;
/// `rows` prints whatever has been applied so far.
pub async fn run(api: Arc<dyn CatalogApi>, options: FetchOptions) -> Result<()> {
    let browser = CatalogBrowser::open(api, options);

    // surface mutation outcomes as they arrive, snackbar-style
    let mut notices = browser.notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            println!("{notice}");
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "search" => {
                browser.set_query(rest);
            }
            "clear" => {
                browser.clear_query();
            }
            "rows" => print_rows(&browser.rows()),
            "toggle" | "delete" if rest.is_empty() => println!("usage: {command} <id>"),
            "toggle" => {
                browser.toggle(rest);
            }
            "delete" => {
                browser.delete(rest).await;
            }
            "refresh" => browser.refresh().await,
            "quit" | "exit" => break,
            other => println!("unknown command '{other}'; try 'help'"),
        }
    }

    browser.close();
    Ok(())
}

fn print_rows(rows: &[RowView]) {
    if rows.is_empty() {
        println!("(no entities)");
        return;
    }
    for row in rows {
        let marker = match row.visibility {
            RowVisibility::Expanded => '-',
            RowVisibility::Collapsed => '+',
        };
        println!(
            "[{marker}] {}  {}  {}  {}",
            row.summary.id,
            row.summary.name,
            row.summary.summary,
            row.summary.owners.join(", ")
        );
        if row.visibility == RowVisibility::Expanded {
            print_detail(&row.detail);
        }
    }
}

fn print_detail(detail: &DetailState) {
    match detail {
        DetailState::Absent => println!("      (no repository payload)"),
        DetailState::Loading => println!("      loading..."),
        DetailState::Ready(detail) => {
            for line in detail.readme_text.lines().take(4) {
                println!("      {line}");
            }
            for file in detail.schema.iter().chain(detail.rules.iter()) {
                println!("      {}", file.path);
            }
        }
    }
}
