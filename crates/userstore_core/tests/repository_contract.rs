use userstore_core::db::open_db_in_memory;
use userstore_core::{
    InMemoryRepository, SqliteUserRepository, User, UserCreate, UserRepository, UserUpdate,
};

/// Runs `check` once against each backend, each starting empty.
fn for_each_backend(check: impl Fn(&str, &mut UserRepository<'_>)) {
    let mut local = InMemoryRepository::<User>::new();
    check("local", &mut local);

    let conn = open_db_in_memory().unwrap();
    let mut sqlite = SqliteUserRepository::try_new(&conn).unwrap();
    check("sqlite", &mut sqlite);
}

fn payload(tag: &str) -> UserCreate {
    UserCreate::new(
        format!("first_{tag}"),
        format!("last_{tag}"),
        format!("user_{tag}"),
        format!("{tag}@example.com"),
    )
}

#[test]
fn list_is_empty_initially() {
    for_each_backend(|backend, repo| {
        assert!(repo.list().unwrap().is_empty(), "{backend}");
    });
}

#[test]
fn create_then_get_round_trips_every_field() {
    for_each_backend(|backend, repo| {
        let input = payload("one");
        let created = repo.create(&input).unwrap();
        let loaded = repo.get(created.id).unwrap().unwrap();

        assert_eq!(loaded, created, "{backend}");
        assert_eq!(loaded.first_name.as_deref(), Some(input.first_name.as_str()));
        assert_eq!(loaded.last_name.as_deref(), Some(input.last_name.as_str()));
        assert_eq!(loaded.username.as_deref(), Some(input.username.as_str()));
        assert_eq!(loaded.email.as_deref(), Some(input.email.as_str()));
    });
}

#[test]
fn create_patch_delete_scenario() {
    for_each_backend(|backend, repo| {
        let created = repo
            .create(&UserCreate::new("A", "B", "ab", "a@b.c"))
            .unwrap();
        assert_eq!(
            created,
            User {
                id: 1,
                first_name: Some("A".to_string()),
                last_name: Some("B".to_string()),
                username: Some("ab".to_string()),
                email: Some("a@b.c".to_string()),
            },
            "{backend}"
        );

        let patched = repo
            .patch(
                1,
                &UserUpdate {
                    username: Some("ab2".to_string()),
                    ..UserUpdate::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(patched.first_name.as_deref(), Some("A"), "{backend}");
        assert_eq!(patched.last_name.as_deref(), Some("B"), "{backend}");
        assert_eq!(patched.username.as_deref(), Some("ab2"), "{backend}");
        assert_eq!(patched.email.as_deref(), Some("a@b.c"), "{backend}");

        assert!(repo.delete(1).unwrap(), "{backend}");
        assert!(repo.get(1).unwrap().is_none(), "{backend}");
        assert!(!repo.delete(1).unwrap(), "{backend}");
    });
}

#[test]
fn identifiers_are_unique_and_never_reused() {
    for_each_backend(|backend, repo| {
        let ids: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|tag| repo.create(&payload(tag)).unwrap().id)
            .collect();
        assert_eq!(ids, [1, 2, 3], "{backend}");

        assert!(repo.delete(3).unwrap());
        let next = repo.create(&payload("d")).unwrap();
        assert_eq!(next.id, 4, "{backend}");
    });
}

#[test]
fn patch_with_one_field_changes_only_that_field() {
    let single_field_updates = [
        UserUpdate {
            first_name: Some("patched".to_string()),
            ..UserUpdate::default()
        },
        UserUpdate {
            last_name: Some("patched".to_string()),
            ..UserUpdate::default()
        },
        UserUpdate {
            username: Some("patched".to_string()),
            ..UserUpdate::default()
        },
        UserUpdate {
            email: Some("patched".to_string()),
            ..UserUpdate::default()
        },
    ];

    for update in single_field_updates {
        for_each_backend(|backend, repo| {
            let before = repo.create(&payload("p")).unwrap();
            let after = repo.patch(before.id, &update).unwrap().unwrap();

            let pick = |present: &Option<String>, old: &Option<String>| {
                present.clone().or_else(|| old.clone())
            };
            assert_eq!(after.id, before.id, "{backend}");
            assert_eq!(after.first_name, pick(&update.first_name, &before.first_name));
            assert_eq!(after.last_name, pick(&update.last_name, &before.last_name));
            assert_eq!(after.username, pick(&update.username, &before.username));
            assert_eq!(after.email, pick(&update.email, &before.email));
            assert_eq!(repo.get(before.id).unwrap().unwrap(), after, "{backend}");
        });
    }
}

#[test]
fn patch_without_fields_keeps_record() {
    for_each_backend(|backend, repo| {
        let before = repo.create(&payload("same")).unwrap();
        let after = repo
            .patch(before.id, &UserUpdate::default())
            .unwrap()
            .unwrap();
        assert_eq!(after, before, "{backend}");
    });
}

#[test]
fn update_replaces_every_field() {
    for_each_backend(|backend, repo| {
        let created = repo.create(&payload("old")).unwrap();
        let updated = repo
            .update(
                created.id,
                &UserUpdate::all("new_first", "new_last", "new_user", "new@example.com"),
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.first_name.as_deref(), Some("new_first"), "{backend}");
        assert_eq!(updated.last_name.as_deref(), Some("new_last"), "{backend}");
        assert_eq!(updated.username.as_deref(), Some("new_user"), "{backend}");
        assert_eq!(updated.email.as_deref(), Some("new@example.com"), "{backend}");
        assert_eq!(repo.get(created.id).unwrap().unwrap(), updated, "{backend}");
    });
}

#[test]
fn update_writes_absent_fields_as_unset() {
    for_each_backend(|backend, repo| {
        let created = repo.create(&payload("full")).unwrap();
        let update = UserUpdate {
            email: Some("only@example.com".to_string()),
            ..UserUpdate::default()
        };

        let updated = repo.update(created.id, &update).unwrap().unwrap();
        let expected = User {
            id: created.id,
            first_name: None,
            last_name: None,
            username: None,
            email: Some("only@example.com".to_string()),
        };
        assert_eq!(updated, expected, "{backend}");
        assert_eq!(repo.get(created.id).unwrap().unwrap(), expected, "{backend}");
    });
}

#[test]
fn unknown_identifier_is_absent_for_every_operation() {
    for_each_backend(|backend, repo| {
        let existing = repo.create(&payload("keep")).unwrap();
        let missing = existing.id + 100;

        assert!(repo.get(missing).unwrap().is_none(), "{backend}");
        assert!(repo
            .update(missing, &UserUpdate::all("a", "b", "c", "d"))
            .unwrap()
            .is_none());
        assert!(repo
            .patch(missing, &UserUpdate::all("a", "b", "c", "d"))
            .unwrap()
            .is_none());
        assert!(!repo.delete(missing).unwrap(), "{backend}");

        assert_eq!(repo.list().unwrap(), vec![existing], "{backend}");
    });
}

#[test]
fn delete_removes_record_from_get_and_list() {
    for_each_backend(|backend, repo| {
        let first = repo.create(&payload("first")).unwrap();
        let second = repo.create(&payload("second")).unwrap();

        assert!(repo.delete(first.id).unwrap(), "{backend}");

        assert!(repo.get(first.id).unwrap().is_none(), "{backend}");
        let remaining: Vec<_> = repo.list().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(remaining, [second.id], "{backend}");
    });
}

#[test]
fn list_returns_records_in_creation_order() {
    for_each_backend(|backend, repo| {
        for tag in ["x", "y", "z"] {
            repo.create(&payload(tag)).unwrap();
        }

        let usernames: Vec<_> = repo
            .list()
            .unwrap()
            .into_iter()
            .filter_map(|user| user.username)
            .collect();
        assert_eq!(usernames, ["user_x", "user_y", "user_z"], "{backend}");
    });
}
