use notehub_core::repo::notebook_codec::NOTEBOOK_KEY;
use notehub_core::{KvNoteRepository, MemoryKvStore, Note, NoteService, RepoError};

fn service() -> NoteService<KvNoteRepository<MemoryKvStore>> {
    NoteService::new(KvNoteRepository::new(MemoryKvStore::new()))
}

fn texts(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.text.as_str()).collect()
}

#[test]
fn buy_milk_trash_and_recover_scenario() {
    let mut service = service();
    service.save_note("Buy milk", None);
    assert_eq!(texts(&service.load_active()), vec!["Buy milk"]);
    assert!(service.load_trash().is_empty());

    let notebook = service.move_to_trash_at(0);
    assert!(notebook.active.is_empty());
    assert_eq!(texts(&notebook.trash), vec!["Buy milk"]);

    let notebook = service.recover_note_at(0);
    assert_eq!(texts(&notebook.active), vec!["Buy milk"]);
    assert!(notebook.trash.is_empty());
    assert!(service.last_error().is_none());
}

#[test]
fn save_edited_note_at_replaces_position() {
    let mut service = service();
    service.save_note("A", None);
    service.save_note("B", None);

    let active = service.save_edited_note_at("B2", 1);
    assert_eq!(texts(&active), vec!["A", "B2"]);
    assert_eq!(texts(&service.load_active()), vec!["A", "B2"]);
}

#[test]
fn save_note_at_appends_or_edits_by_position() {
    let mut service = service();
    service.save_note_at("A", None);
    service.save_note_at("B", None);

    let active = service.save_note_at("A2", Some(0));
    assert_eq!(texts(&active), vec!["A2", "B"]);

    let active = service.save_note_at("C", Some(9));
    assert_eq!(texts(&active), vec!["A2", "B"]);
    assert!(matches!(
        service.last_error(),
        Some(RepoError::IndexOutOfRange { index: 9, len: 2 })
    ));
}

#[test]
fn save_note_roundtrip_contains_saved_text() {
    let mut service = service();
    service.save_note("x", None);
    assert!(service.load_active().iter().any(|note| note.text == "x"));
}

#[test]
fn newline_only_save_appends_a_note() {
    let mut service = service();

    let active = service.save_note("\n", None);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].text, "\n");
    assert!(service.last_error().is_none());
}

#[test]
fn empty_save_is_a_no_op() {
    let mut service = service();
    service.save_note("only", None);

    let active = service.save_note("", None);
    assert_eq!(texts(&active), vec!["only"]);
    assert!(service.last_error().is_none());
}

#[test]
fn delete_permanently_at_and_delete_all() {
    let mut service = service();
    for text in ["a", "b", "c"] {
        service.save_note(text, None);
        service.move_to_trash_at(0);
    }
    assert_eq!(texts(&service.load_trash()), vec!["a", "b", "c"]);

    let trash = service.delete_permanently_at(1);
    assert_eq!(texts(&trash), vec!["a", "c"]);

    let trash = service.delete_all_trash();
    assert!(trash.is_empty());
    assert!(service.load_trash().is_empty());
}

#[test]
fn out_of_range_index_is_logged_no_op() {
    let mut service = service();
    service.save_note("a", None);

    let notebook = service.move_to_trash_at(5);
    assert_eq!(texts(&notebook.active), vec!["a"]);
    assert!(matches!(
        service.last_error(),
        Some(RepoError::IndexOutOfRange { index: 5, len: 1 })
    ));

    let trash = service.delete_permanently_at(0);
    assert!(trash.is_empty());
    assert!(service.last_error().is_some());
}

#[test]
fn read_failure_returns_last_known_state() {
    let mut service = service();
    service.save_note("cached", None);
    assert_eq!(texts(&service.load_active()), vec!["cached"]);

    service.repo_mut().store_mut().set_fail_reads(true);
    assert_eq!(texts(&service.load_active()), vec!["cached"]);
    assert!(service.load_trash().is_empty());
    assert!(matches!(service.last_error(), Some(RepoError::Store(_))));
}

#[test]
fn read_failure_before_any_load_yields_empty() {
    let mut store = MemoryKvStore::new();
    store.set_fail_reads(true);
    let mut service = NoteService::new(KvNoteRepository::new(store));

    assert!(service.load_active().is_empty());
    assert!(service.last_error().is_some());
}

#[test]
fn write_failure_is_swallowed_and_state_kept() {
    let mut store = MemoryKvStore::new();
    let mut seed = NoteService::new(KvNoteRepository::new(&mut store));
    seed.save_note("persisted", None);
    drop(seed);

    store.set_fail_writes(true);
    let mut service = NoteService::new(KvNoteRepository::new(&mut store));
    assert_eq!(texts(&service.load_active()), vec!["persisted"]);

    let active = service.save_note("dropped", None);
    assert_eq!(texts(&active), vec!["persisted"]);
    assert!(matches!(service.last_error(), Some(RepoError::Store(_))));

    let notebook = service.move_to_trash_at(0);
    assert_eq!(texts(&notebook.active), vec!["persisted"]);
    assert!(notebook.trash.is_empty());
    drop(service);

    store.set_fail_writes(false);
    assert!(!store.raw(NOTEBOOK_KEY).unwrap().contains("dropped"));
}

#[test]
fn success_clears_previous_error() {
    let mut service = service();
    service.recover_note_at(0);
    assert!(service.last_error().is_some());

    service.save_note("ok", None);
    assert!(service.last_error().is_none());
}
