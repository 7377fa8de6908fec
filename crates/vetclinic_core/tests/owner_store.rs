use vetclinic_core::{
    BrowseQuery, DbPool, EntityKind, ErrorKind, OwnerFields, RepoError, Repository,
    SqliteOwnerRepository,
};

#[test]
fn create_returns_stored_owner_and_increments_count() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    let before = repo.count().unwrap();

    let fields = OwnerFields::new("Ana", "Ruiz", "123", "555", "a@x.com");
    let created = repo.create(&fields).unwrap();

    assert!(created.id > 0);
    assert_eq!(created.first_name, "Ana");
    assert_eq!(created.last_name, "Ruiz");
    assert_eq!(created.national_id, "123");
    assert_eq!(created.phone, "555");
    assert_eq!(created.email, "a@x.com");
    assert_eq!(created.fields(), fields);
    assert_eq!(repo.count().unwrap(), before + 1);
}

#[test]
fn create_then_find_by_id_roundtrip() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);

    let created = repo.create(&owner("Luis", "Vega", "900")).unwrap();
    let loaded = repo.find_by_id(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn find_by_id_missing_returns_none() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);

    assert!(repo.find_by_id(42).unwrap().is_none());
}

#[test]
fn find_all_orders_by_first_name_ignoring_case_and_accents() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    repo.create(&owner("marta", "Gil", "1")).unwrap();
    repo.create(&owner("Bruno", "Paz", "2")).unwrap();
    repo.create(&owner("Álvaro", "Sanz", "3")).unwrap();
    repo.create(&owner("Carla", "Rey", "4")).unwrap();

    let names = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|owner| owner.first_name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Álvaro", "Bruno", "Carla", "marta"]);
}

#[test]
fn search_matches_without_accents_either_way() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    let lucia = repo.create(&owner("Lucía", "Martínez", "1")).unwrap();
    repo.create(&owner("Pedro", "Gil", "2")).unwrap();

    assert_eq!(repo.search_by_term("martinez").unwrap(), vec![lucia.clone()]);
    assert_eq!(repo.search_by_term("LUCÍA").unwrap(), vec![lucia]);
}

#[test]
fn update_overwrites_every_field() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    let created = repo.create(&owner("Ana", "Ruiz", "123")).unwrap();

    let changes = OwnerFields::new("Ana María", "Ruiz Soto", "124", "777", "am@x.com");
    let updated = repo.update(created.id, &changes).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.fields(), changes);
    assert_eq!(repo.find_by_id(created.id).unwrap().unwrap(), updated);
}

#[test]
fn update_missing_id_returns_not_found_without_inserting() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    repo.create(&owner("Ana", "Ruiz", "123")).unwrap();

    let err = repo.update(999, &owner("Ghost", "Owner", "000")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: EntityKind::Owner,
            id: 999
        }
    ));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(repo.count().unwrap(), 1);
    assert!(repo.find_by_id(999).unwrap().is_none());
}

#[test]
fn delete_returns_true_then_false() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    let keep = repo.create(&owner("Ana", "Ruiz", "1")).unwrap();
    let doomed = repo.create(&owner("Luis", "Vega", "2")).unwrap();

    assert!(repo.delete(doomed.id).unwrap());
    assert_eq!(repo.count().unwrap(), 1);
    assert!(!repo.delete(doomed.id).unwrap());
    assert_eq!(repo.count().unwrap(), 1);
    assert!(repo.find_by_id(keep.id).unwrap().is_some());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    let first = repo.create(&owner("Ana", "Ruiz", "1")).unwrap();
    repo.delete(first.id).unwrap();

    let second = repo.create(&owner("Ana", "Ruiz", "1")).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn search_matches_first_or_last_name_ignoring_case() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    repo.create(&owner("Ana", "Ruiz", "1")).unwrap();
    repo.create(&owner("Luis", "Martínez", "2")).unwrap();
    repo.create(&owner("Martina", "Gil", "3")).unwrap();
    repo.create(&owner("Pedro", "Sol", "4")).unwrap();

    let hits = repo.search_by_term("MART").unwrap();
    let names = hits
        .iter()
        .map(|owner| owner.first_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Luis", "Martina"]);

    assert!(repo.search_by_term("zzz").unwrap().is_empty());
}

#[test]
fn search_does_not_match_phone_or_email() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    repo.create(&OwnerFields::new("Ana", "Ruiz", "1", "5551234", "ana@clinic.com"))
        .unwrap();

    assert!(repo.search_by_term("555").unwrap().is_empty());
    assert!(repo.search_by_term("clinic").unwrap().is_empty());
}

#[test]
fn search_treats_like_wildcards_literally() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    repo.create(&owner("Ana", "Ruiz", "1")).unwrap();
    repo.create(&owner("100%", "Real", "2")).unwrap();

    let hits = repo.search_by_term("%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name, "100%");
}

#[test]
fn reused_national_id_is_duplicate_entry() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    let ana = repo.create(&owner("Ana", "Ruiz", "123")).unwrap();
    let luis = repo.create(&owner("Luis", "Vega", "456")).unwrap();

    let err = repo.create(&owner("Other", "Person", "123")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    assert_eq!(err.kind().http_status(), 409);
    assert_eq!(repo.count().unwrap(), 2);

    let err = repo.update(luis.id, &owner("Luis", "Vega", "123")).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEntry { .. }));
    assert_eq!(repo.find_by_id(ana.id).unwrap().unwrap(), ana);
    assert_eq!(repo.find_by_id(luis.id).unwrap().unwrap(), luis);
}

#[test]
fn browse_with_search_returns_single_page() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    for (index, name) in ["Ana", "Anabel", "Juana", "Pedro"].iter().enumerate() {
        repo.create(&owner(name, "Ruiz", &index.to_string())).unwrap();
    }

    let query = BrowseQuery {
        search: Some("  ana ".to_string()),
        page: Some("3".into()),
        limit: Some("2".into()),
    };
    let page = repo.browse(&query).unwrap();

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.pagination.current_page, 1);
    assert_eq!(page.pagination.total_pages, 1);
    assert_eq!(page.pagination.total_item_count, 3);
    assert!(!page.pagination.has_next_page);
    assert!(!page.pagination.has_prev_page);
}

#[test]
fn browse_without_search_paginates_raw_values() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    for index in 0..5 {
        repo.create(&owner(&format!("Owner{index}"), "Ruiz", &index.to_string()))
            .unwrap();
    }

    let query = BrowseQuery {
        page: Some("2".into()),
        limit: Some("2abc".into()),
        search: Some("   ".to_string()),
    };
    let page = repo.browse(&query).unwrap();

    let names = page
        .items
        .iter()
        .map(|owner| owner.first_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Owner2", "Owner3"]);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.limit, 2);
}

#[test]
fn owner_serializes_with_camel_case_keys() {
    let pool = DbPool::in_memory().unwrap();
    let repo = SqliteOwnerRepository::new(&pool);
    let created = repo.create(&owner("Ana", "Ruiz", "123")).unwrap();

    let json = serde_json::to_value(&created).unwrap();
    assert_eq!(json["id"], created.id);
    assert_eq!(json["firstName"], "Ana");
    assert_eq!(json["lastName"], "Ruiz");
    assert_eq!(json["nationalId"], "123");
}

fn owner(first_name: &str, last_name: &str, national_id: &str) -> OwnerFields {
    OwnerFields::new(
        first_name,
        last_name,
        national_id,
        "555-0100",
        format!("{}@example.com", first_name.to_lowercase()),
    )
}
