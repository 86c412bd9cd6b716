//! End-to-end lookup, save and refresh over the in-memory backend

use plates_core::prelude::*;

fn config() -> StoreConfig {
    StoreConfig::new("acme", "plates").with_token("t0k")
}

#[tokio::test]
async fn test_add_then_update_plate() -> anyhow::Result<()> {
    let service = PlateService::new(RecordStore::new(
        MemoryBackend::new().with_user("octocat"),
    ));
    let cfg = config();

    // New plate: nothing stored yet
    let lookup = service.lookup(&cfg, "ab12 cde").await?;
    assert_eq!(lookup.plate, "AB12CDE");
    assert!(lookup.warning.is_none());
    assert!(lookup.handle().is_none());

    let draft = PlateDraft {
        owner: "Jo".to_string(),
        notes: "blue van".to_string(),
        ..Default::default()
    };
    service.save(&cfg, &lookup.plate, draft, lookup.handle()).await?;

    // Existing plate: edit with the handle from a fresh lookup
    let lookup = service.lookup(&cfg, "AB12-CDE").await?;
    let mut draft = lookup.draft();
    assert_eq!(draft.notes, "blue van");
    draft.flagged = true;
    draft.flag_reason = "reported".to_string();
    let saved = service
        .save(&cfg, &lookup.plate, draft, lookup.handle())
        .await?;
    assert_eq!(saved.added_by, "octocat");

    let rows = service.refresh(&cfg, "").await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].plate, "AB12CDE");
    assert!(rows[0].flagged);
    assert_eq!(rows[0].flag_reason, "reported");
    Ok(())
}

#[tokio::test]
async fn test_losing_writer_gets_conflict_and_can_retry() -> anyhow::Result<()> {
    let service = PlateService::new(RecordStore::new(MemoryBackend::new()));
    let cfg = config();
    service
        .save(&cfg, "A1", PlateDraft::default(), None)
        .await?;

    let alice = service.lookup(&cfg, "A1").await?;
    let bob = service.lookup(&cfg, "A1").await?;

    let alice_draft = PlateDraft {
        notes: "alice".to_string(),
        ..alice.draft()
    };
    service
        .save(&cfg, &alice.plate, alice_draft, alice.handle())
        .await?;

    let bob_draft = PlateDraft {
        notes: "bob".to_string(),
        ..bob.draft()
    };
    let err = service
        .save(&cfg, &bob.plate, bob_draft.clone(), bob.handle())
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    // Reload and retry is the caller's call
    let reloaded = service.lookup(&cfg, "A1").await?;
    assert_eq!(reloaded.draft().notes, "alice");
    service
        .save(&cfg, &reloaded.plate, bob_draft, reloaded.handle())
        .await?;
    assert_eq!(service.lookup(&cfg, "A1").await?.draft().notes, "bob");
    Ok(())
}

#[tokio::test]
async fn test_refresh_filters_and_sorts() -> anyhow::Result<()> {
    let service = PlateService::new(RecordStore::new(MemoryBackend::new()));
    let cfg = config();
    for plate in ["ZZ99ZZZ", "AB12CDE", "A1"] {
        service
            .save(&cfg, plate, PlateDraft::default(), None)
            .await?;
    }

    let all: Vec<String> = service
        .refresh(&cfg, "")
        .await?
        .into_iter()
        .map(|row| row.plate)
        .collect();
    assert_eq!(all, ["A1", "AB12CDE", "ZZ99ZZZ"]);

    let filtered: Vec<String> = service
        .refresh(&cfg, "ab")
        .await?
        .into_iter()
        .map(|row| row.plate)
        .collect();
    assert_eq!(filtered, ["AB12CDE"]);
    Ok(())
}
