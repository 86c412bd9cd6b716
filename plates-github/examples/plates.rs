/// Look up, save and list plates in a GitHub repository
///
/// Coordinates come from `PLATES_OWNER`, `PLATES_REPO`, `PLATES_BRANCH` and
/// `PLATES_TOKEN`, falling back to a saved `plates.json` in the working directory.
/// `PLATES_LOG_FORMAT=json` switches console logs to JSON lines.
///
/// ```text
/// cargo run -p plates-github --example plates -- list [filter]
/// cargo run -p plates-github --example plates -- lookup AB12CDE
/// cargo run -p plates-github --example plates -- flag AB12CDE "seen twice"
/// ```
use plates_core::logging::{init_logging, LogFormat};
use plates_core::prelude::*;
use plates_github::GitHub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format: LogFormat = std::env::var("PLATES_LOG_FORMAT")
        .unwrap_or_default()
        .parse()?;
    init_logging("info", format, None)?;

    let config_file = ConfigFile::new("plates.json");
    let config = match StoreConfig::from_env() {
        Ok(config) => {
            config_file.save(&config).await?;
            config
        }
        Err(_) => config_file.load().await?.ok_or_else(|| {
            anyhow::anyhow!("Missing config. Set PLATES_OWNER and PLATES_REPO first.")
        })?,
    };

    let service = PlateService::new(RecordStore::new(GitHub::new()?));
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("lookup") => {
            let raw = args.get(1).map(String::as_str).unwrap_or_default();
            let lookup = service.lookup(&config, raw).await?;
            if let Some(warning) = &lookup.warning {
                println!("warning: {}", warning);
            }
            match &lookup.existing {
                Some((record, _)) => println!("{}", serde_json::to_string_pretty(record)?),
                None => println!("{} not found; you can add it.", lookup.plate),
            }
        }
        Some("flag") => {
            let raw = args.get(1).map(String::as_str).unwrap_or_default();
            let reason = args.get(2).cloned().unwrap_or_default();
            let lookup = service.lookup(&config, raw).await?;
            let draft = PlateDraft {
                flagged: true,
                flag_reason: reason,
                ..lookup.draft()
            };
            match service
                .save(&config, &lookup.plate, draft, lookup.handle())
                .await
            {
                Ok(record) => println!("Saved {} (by {:?})", record.plate, record.added_by),
                Err(e) if e.is_conflict() => {
                    println!(
                        "{} changed since it was read; look it up again and retry.",
                        lookup.plate
                    )
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some("list") | None => {
            let filter = args.get(1).map(String::as_str).unwrap_or_default();
            let rows = service.refresh(&config, filter).await?;
            if rows.is_empty() {
                println!("No plates saved yet.");
            }
            for row in rows {
                let flag = if row.flagged {
                    format!(" [flagged: {}]", row.flag_reason)
                } else {
                    String::new()
                };
                println!("{}{}  {}  added {}", row.plate, flag, row.notes, row.added_at);
            }
        }
        Some(other) => anyhow::bail!("unknown command: {}", other),
    }

    Ok(())
}
