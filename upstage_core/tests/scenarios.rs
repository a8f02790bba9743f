use anyhow::Result;
use upstage_core::{Profile, ProfileStore, ProfileUpdate, StoreError};

mod common;
use common::TempStore;

#[test]
fn add_then_get_returns_the_same_profile() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;

    let p = Profile::new("prod", "example.com")
        .with_username("deploy")
        .with_port(2200)
        .with_key("~/.ssh/id_ed25519");
    store.add(p.clone())?;

    assert_eq!(store.get("prod")?, &p);
    Ok(())
}

#[test]
fn remove_then_get_is_not_found() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;
    store.add(Profile::new("lab", "lab.local"))?;

    store.remove("lab")?;

    assert!(matches!(store.get("lab"), Err(StoreError::NotFound(n)) if n == "lab"));
    Ok(())
}

#[test]
fn list_preserves_insertion_order_across_removal() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;
    let p1 = Profile::new("zeta", "z.example.com");
    let p2 = Profile::new("alpha", "a.example.com");

    store.add(p1.clone())?;
    store.add(p2.clone())?;
    assert_eq!(store.list().cloned().collect::<Vec<_>>(), [p1.clone(), p2.clone()]);

    store.remove(&p1.name)?;
    assert_eq!(store.list().cloned().collect::<Vec<_>>(), [p2]);
    Ok(())
}

#[test]
fn list_is_restartable() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;
    store.add(Profile::new("a", "h1"))?;
    store.add(Profile::new("b", "h2"))?;

    let listing = store.list();
    let first: Vec<_> = listing.clone().map(|p| p.name.clone()).collect();
    let second: Vec<_> = listing.map(|p| p.name.clone()).collect();
    assert_eq!(first, second);
    assert_eq!(store.list().len(), 2);
    Ok(())
}

#[test]
fn prod_lifecycle() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;

    store.add(Profile::new("prod", "10.0.0.1").with_port(22))?;

    let dup = store.add(Profile::new("prod", "10.0.0.2").with_port(2222));
    assert!(matches!(dup, Err(StoreError::DuplicateName(n)) if n == "prod"));

    let updated = store.update(
        "prod",
        &ProfileUpdate {
            port: Some(2222),
            ..Default::default()
        },
    )?;
    assert_eq!(updated, Profile::new("prod", "10.0.0.1").with_port(2222));
    assert_eq!(store.get("prod")?, &updated);

    store.remove("prod")?;
    assert!(matches!(store.get("prod"), Err(StoreError::NotFound(_))));
    Ok(())
}

#[test]
fn out_of_range_port_is_rejected_naming_port() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;

    let err = store
        .add(Profile::new("x", "h").with_port(70000))
        .expect_err("port 70000 must be rejected");

    assert!(matches!(err, StoreError::Validation { field: "port", .. }), "got {err:?}");
    assert!(store.is_empty());
    assert!(!temp.path.exists(), "a rejected add must not create the file");
    Ok(())
}

#[test]
fn update_and_remove_unknown_names_are_not_found() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;

    assert!(matches!(store.remove("ghost"), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update("ghost", &ProfileUpdate::default()),
        Err(StoreError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn invalid_update_leaves_the_record_unchanged() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;
    store.add(Profile::new("prod", "10.0.0.1"))?;
    let before = std::fs::read(&temp.path)?;

    let err = store
        .update(
            "prod",
            &ProfileUpdate {
                port: Some(0),
                ..Default::default()
            },
        )
        .expect_err("port 0 must be rejected");

    assert!(matches!(err, StoreError::Validation { field: "port", .. }));
    assert_eq!(store.get("prod")?.port, 22);
    assert_eq!(std::fs::read(&temp.path)?, before);
    Ok(())
}

#[test]
fn update_can_clear_optional_fields_and_keeps_position() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;
    store.add(Profile::new("a", "h1"))?;
    store.add(Profile::new("b", "h2").with_username("root").with_key("/k"))?;
    store.add(Profile::new("c", "h3"))?;

    let b = store.update(
        "b",
        &ProfileUpdate {
            host: Some("h2.example.com".into()),
            username: Some(None),
            key: Some(None),
            ..Default::default()
        },
    )?;

    assert_eq!(b, Profile::new("b", "h2.example.com"));
    let names: Vec<_> = store.list().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    Ok(())
}

#[test]
fn no_successful_sequence_breaks_the_invariants() -> Result<()> {
    let temp = TempStore::new();
    let mut store = ProfileStore::open(&temp.path)?;

    for (i, port) in [22u32, 0, 65535, 65536, 8022, 100_000].into_iter().enumerate() {
        let _ = store.add(Profile::new(format!("p{}", i % 3), "host").with_port(port));
        let _ = store.update(
            "p1",
            &ProfileUpdate {
                port: Some(port),
                ..Default::default()
            },
        );
    }

    let reopened = ProfileStore::open(&temp.path)?;
    let mut names: Vec<_> = reopened.list().map(|p| p.name.clone()).collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total, "duplicate names on disk");
    assert!(reopened.list().all(|p| (1..=65535).contains(&p.port)));
    Ok(())
}
