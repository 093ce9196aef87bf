use pinvault_db::models::NewUser;
use pinvault_db::seed::{SEED_HISTORY_DAYS, sample_size};
use pinvault_db::{
    CatalogRepository, CollectionRepository, Database, Error, MessageRepository, TokenRepository,
    UserRepository, WantListRepository,
};
use pinvault_types::models::{
    CollectionChanges, NewCollectionEntry, NewPin, NewWantListEntry, WantListChanges,
};

fn new_user(db: &Database, username: &str) -> i64 {
    db.create_user(&NewUser {
        username: username.to_string(),
        password_hash: "$argon2id$fake".to_string(),
        display_name: None,
        email: None,
        avatar_url: None,
        is_admin: false,
    })
    .unwrap()
    .id
}

fn new_pin(db: &Database, name: &str) -> i64 {
    db.create_pin(&NewPin {
        name: name.to_string(),
        ..Default::default()
    })
    .unwrap()
    .id
}

#[test]
fn duplicate_username_is_a_conflict() {
    let db = Database::open_in_memory().unwrap();
    new_user(&db, "alice");
    let err = db
        .create_user(&NewUser {
            username: "alice".to_string(),
            password_hash: "x".to_string(),
            display_name: None,
            email: None,
            avatar_url: None,
            is_admin: false,
        })
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn user_lookup_trims_and_ignores_blank_names() {
    let db = Database::open_in_memory().unwrap();
    new_user(&db, "alice");
    assert!(db.user_by_username("  alice ").unwrap().is_some());
    assert!(db.user_by_username("   ").unwrap().is_none());
}

#[test]
fn set_admin_promotes_existing_user() {
    let db = Database::open_in_memory().unwrap();
    let id = new_user(&db, "devtest");
    assert!(db.set_admin("devtest", true).unwrap());
    assert!(db.user_by_id(id).unwrap().unwrap().is_admin);
    assert!(!db.set_admin("nobody", true).unwrap());
}

#[test]
fn missing_pin_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(db.pin(42), Err(Error::NotFound("pin"))));
    assert!(matches!(db.pin_stats(42), Err(Error::NotFound("pin"))));
}

#[test]
fn new_pin_has_empty_price_history() {
    let db = Database::open_in_memory().unwrap();
    let pin = new_pin(&db, "Monorail");
    assert!(db.price_history(pin).unwrap().is_empty());
}

#[test]
fn record_price_updates_value_and_history_together() {
    let db = Database::open_in_memory().unwrap();
    let pin = new_pin(&db, "Monorail");

    let updated = db.record_price(pin, 31.5, "eBay").unwrap();
    assert_eq!(updated.current_value, Some(31.5));

    let history = db.price_history(pin).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price, 31.5);
    assert_eq!(history[0].source, "eBay");
}

#[test]
fn record_price_for_unknown_pin_writes_nothing() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(db.record_price(9, 10.0, "eBay"), Err(Error::NotFound("pin"))));
    let orphans: i64 = db
        .with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM pin_price_history", [], |r| r.get(0))?)
        })
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn value_and_history_can_be_written_separately() {
    let db = Database::open_in_memory().unwrap();
    let pin = new_pin(&db, "Monorail");

    assert_eq!(db.update_pin_value(pin, 8.0).unwrap().current_value, Some(8.0));
    let entry = db.append_price(pin, 9.5, "manual").unwrap();
    assert_eq!(entry.pin_id, pin);
    assert_eq!(db.price_history(pin).unwrap(), vec![entry]);

    assert!(matches!(db.update_pin_value(404, 1.0), Err(Error::NotFound("pin"))));
    assert!(matches!(db.append_price(404, 1.0, "manual"), Err(Error::NotFound("pin"))));
}

#[test]
fn import_pin_with_value_starts_its_history() {
    let db = Database::open_in_memory().unwrap();
    let pin = db
        .import_pin(
            &NewPin {
                name: "Imported".to_string(),
                current_value: Some(12.0),
                ..Default::default()
            },
            "eBay",
        )
        .unwrap();
    assert_eq!(db.price_history(pin.id).unwrap().len(), 1);

    let free = db
        .import_pin(
            &NewPin {
                name: "No price".to_string(),
                ..Default::default()
            },
            "eBay",
        )
        .unwrap();
    assert!(db.price_history(free.id).unwrap().is_empty());
    assert_eq!(db.find_pin_by_name("Imported").unwrap().map(|p| p.id), Some(pin.id));
}

#[test]
fn collection_add_list_remove() {
    let db = Database::open_in_memory().unwrap();
    let user = new_user(&db, "alice");
    let pin = new_pin(&db, "Stitch");

    db.add_to_collection(
        user,
        &NewCollectionEntry {
            pin_id: pin,
            notes: Some("from the park".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let items = db.list_collection(user).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].pin.id, pin);
    assert_eq!(items[0].entry.notes.as_deref(), Some("from the park"));

    assert!(db.remove_from_collection(user, pin).unwrap());
    assert!(db.list_collection(user).unwrap().is_empty());
    assert!(!db.remove_from_collection(user, pin).unwrap());
}

#[test]
fn duplicate_collection_add_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let user = new_user(&db, "alice");
    let pin = new_pin(&db, "Stitch");
    let entry = NewCollectionEntry {
        pin_id: pin,
        ..Default::default()
    };
    db.add_to_collection(user, &entry).unwrap();
    assert!(matches!(db.add_to_collection(user, &entry), Err(Error::Conflict(_))));
    assert_eq!(db.list_collection(user).unwrap().len(), 1);
}

#[test]
fn collection_add_for_unknown_pin_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    let user = new_user(&db, "alice");
    let entry = NewCollectionEntry {
        pin_id: 77,
        ..Default::default()
    };
    assert!(matches!(db.add_to_collection(user, &entry), Err(Error::NotFound("pin"))));
}

#[test]
fn collection_update_keeps_untouched_fields() {
    let db = Database::open_in_memory().unwrap();
    let user = new_user(&db, "alice");
    let pin = new_pin(&db, "Stitch");
    let entry = db
        .add_to_collection(
            user,
            &NewCollectionEntry {
                pin_id: pin,
                notes: Some("gift".to_string()),
                purchase_price: Some(20.0),
                ..Default::default()
            },
        )
        .unwrap();

    let updated = db
        .update_collection_entry(
            user,
            entry.id,
            &CollectionChanges {
                for_trade: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(updated.for_trade);
    assert_eq!(updated.notes.as_deref(), Some("gift"));
    assert_eq!(updated.purchase_price, Some(20.0));

    let other = new_user(&db, "bob");
    assert!(matches!(
        db.update_collection_entry(other, entry.id, &CollectionChanges::default()),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn updates_address_the_entry_not_the_pin() {
    let db = Database::open_in_memory().unwrap();
    let user = new_user(&db, "alice");
    let pins: Vec<i64> = (1..=7).map(|n| new_pin(&db, &format!("Pin {n}"))).collect();

    let first = db
        .add_to_collection(user, &NewCollectionEntry { pin_id: pins[4], ..Default::default() })
        .unwrap();
    let second = db
        .add_to_collection(user, &NewCollectionEntry { pin_id: pins[6], ..Default::default() })
        .unwrap();
    assert_ne!(second.id, second.pin_id);

    let updated = db
        .update_collection_entry(
            user,
            second.id,
            &CollectionChanges {
                notes: Some("mint".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.id, second.id);
    assert_eq!(updated.pin_id, pins[6]);
    assert_eq!(updated.notes.as_deref(), Some("mint"));

    let list = db.list_collection(user).unwrap();
    let untouched = list.iter().find(|i| i.entry.id == first.id).unwrap();
    assert_eq!(untouched.entry.notes, None);

    let wanted = db
        .add_to_want_list(user, &NewWantListEntry { pin_id: pins[6], priority: 1, max_price: None })
        .unwrap();
    assert_ne!(wanted.id, wanted.pin_id);
    let entry = db
        .update_want_list_entry(
            user,
            wanted.id,
            &WantListChanges {
                priority: Some(3),
                max_price: None,
            },
        )
        .unwrap();
    assert_eq!(entry.pin_id, pins[6]);
    assert_eq!(entry.priority, 3);
    assert!(matches!(
        db.update_want_list_entry(user, pins[6], &WantListChanges::default()),
        Err(Error::NotFound("want list entry"))
    ));
}

#[test]
fn want_list_roundtrip_and_stats() {
    let db = Database::open_in_memory().unwrap();
    let alice = new_user(&db, "alice");
    let bob = new_user(&db, "bob");
    let pin = new_pin(&db, "Jafar");

    let wanted = db
        .add_to_want_list(
            alice,
            &NewWantListEntry {
                pin_id: pin,
                priority: 2,
                max_price: Some(50.0),
            },
        )
        .unwrap();
    db.add_to_want_list(
        bob,
        &NewWantListEntry {
            pin_id: pin,
            priority: 1,
            max_price: None,
        },
    )
    .unwrap();
    db.add_to_collection(
        bob,
        &NewCollectionEntry {
            pin_id: pin,
            ..Default::default()
        },
    )
    .unwrap();

    let stats = db.pin_stats(pin).unwrap();
    assert_eq!(stats.have_count, 1);
    assert_eq!(stats.want_count, 2);

    let entry = db
        .update_want_list_entry(
            alice,
            wanted.id,
            &WantListChanges {
                priority: Some(5),
                max_price: None,
            },
        )
        .unwrap();
    assert_eq!(entry.priority, 5);
    assert_eq!(entry.max_price, Some(50.0));

    let list = db.list_want_list(alice).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].pin.name, "Jafar");

    assert!(db.remove_from_want_list(alice, pin).unwrap());
    assert_eq!(db.pin_stats(pin).unwrap().want_count, 1);
}

#[test]
fn messages_are_listed_for_receiver_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let alice = new_user(&db, "alice");
    let bob = new_user(&db, "bob");

    let first = db.send_message(alice, bob, "hello").unwrap();
    let second = db.send_message(alice, bob, "trade?").unwrap();
    assert!(!first.is_read);

    let inbox = db.messages_for_user(bob).unwrap();
    let ids: Vec<i64> = inbox.iter().map(|m| m.message.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(inbox[0].sender.username, "alice");

    assert!(db.messages_for_user(alice).unwrap().is_empty());
}

#[test]
fn mark_read_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let alice = new_user(&db, "alice");
    let bob = new_user(&db, "bob");
    let msg = db.send_message(alice, bob, "hello").unwrap();

    assert!(db.mark_read(msg.id).unwrap().is_read);
    assert!(db.mark_read(msg.id).unwrap().is_read);
    assert!(matches!(db.mark_read(999), Err(Error::NotFound("message"))));
}

#[test]
fn message_to_unknown_user_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    let alice = new_user(&db, "alice");
    assert!(matches!(
        db.send_message(alice, 404, "hi"),
        Err(Error::NotFound("receiver"))
    ));
}

#[test]
fn revoked_tokens_are_pruned_after_expiry() {
    let db = Database::open_in_memory().unwrap();
    db.revoke_token("old", 100).unwrap();
    db.revoke_token("fresh", 10_000).unwrap();
    db.revoke_token("fresh", 10_000).unwrap();

    assert!(db.is_token_revoked("old").unwrap());
    assert_eq!(db.prune_revoked_tokens(5_000).unwrap(), 1);
    assert!(!db.is_token_revoked("old").unwrap());
    assert!(db.is_token_revoked("fresh").unwrap());
}

#[test]
fn seed_runs_only_on_empty_catalog() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.seed_if_empty().unwrap(), sample_size());
    assert_eq!(db.seed_if_empty().unwrap(), 0);

    let pins = db.list_pins().unwrap();
    assert_eq!(pins.len(), sample_size());

    let history = db.price_history(pins[0].id).unwrap();
    assert_eq!(history.len(), SEED_HISTORY_DAYS as usize);
    assert!(history.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));
}

#[test]
fn reseed_clears_collections_and_restores_sample() {
    let db = Database::open_in_memory().unwrap();
    db.seed_if_empty().unwrap();
    let user = new_user(&db, "alice");
    let extra = new_pin(&db, "Custom pin");
    db.add_to_collection(
        user,
        &NewCollectionEntry {
            pin_id: extra,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(db.reseed().unwrap(), sample_size());
    assert_eq!(db.list_pins().unwrap().len(), sample_size());
    assert!(db.find_pin_by_name("Custom pin").unwrap().is_none());
    assert!(db.list_collection(user).unwrap().is_empty());
    // users survive a reseed
    assert!(db.user_by_id(user).unwrap().is_some());
}

#[test]
fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.db");
    {
        let db = Database::open(&path).unwrap();
        new_pin(&db, "Persisted");
    }
    let db = Database::open(&path).unwrap();
    assert!(db.find_pin_by_name("Persisted").unwrap().is_some());
}
