use campo_asistencia::domain::types::StoreKind;
use campo_asistencia::repository::StoreHealth;

mod common;

#[test]
fn test_creates_and_removes_store_files() {
    let path = {
        let test_db = common::TestDb::new();
        let path = test_db.path().to_path_buf();
        for kind in StoreKind::ALL {
            assert!(
                path.join(kind.file_name()).exists(),
                "{kind} store file should exist"
            );
        }
        path
    };
    assert!(!path.exists(), "temp dir should be removed on drop");
}

#[test]
fn test_reopening_existing_stores_is_idempotent() {
    let test_db = common::TestDb::new();
    let reopened = campo_asistencia::db::Stores::open(test_db.path())
        .expect("should reopen migrated stores");
    let repos = campo_asistencia::repository::Repositories::new(&reopened);

    repos.personnel.ping().expect("personnel store should answer");
    repos.alerts.ping().expect("alert store should answer");
    for catalog in &repos.catalogs {
        catalog.ping().expect("catalog store should answer");
    }
}
