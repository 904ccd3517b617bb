use chrono::{Local, TimeZone};
use introspector_cli::note::render_note;
use introspector_cli::FsVault;
use introspector_core::config::VaultSettings;
use introspector_core::{
    ContextProvider, LinkExistenceChecker, Message, NoteDraft, NotePersister, Style, SummaryResult,
};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

fn write_note(dir: &Path, name: &str, body: &str, age_secs: u64) {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
}

fn draft() -> NoteDraft {
    NoteDraft {
        summary: SummaryResult {
            insights: vec!["Waiting feels safer than choosing".into()],
            links: vec!["[[Fear]]".into(), "[[Decisions]]".into()],
        },
        opening_text: "Quiet morning light\nA question waits by the door\nWhat do you carry\n"
            .into(),
        started_at: Local.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap(),
        style: Style::Warm,
        transcript: vec![
            Message::assistant("Quiet morning light"),
            Message::user("I keep postponing the move"),
            Message::assistant("What would choosing cost you?"),
        ],
    }
}

#[tokio::test]
async fn test_context_is_empty_without_folders() {
    let dir = tempfile::tempdir().unwrap();
    write_note(dir.path(), "Loose.md", "not in a context folder", 0);

    let vault = FsVault::new(dir.path());
    assert_eq!(vault.context().await.unwrap(), "");
}

#[tokio::test]
async fn test_context_lists_newest_notes_first() {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("Journal");
    write_note(&journal, "Old.md", "older entry", 3600);
    write_note(&journal, "New.md", "newer entry", 10);
    write_note(&journal, "image.png", "binary", 0);

    let vault = FsVault::new(dir.path()).with_context_folders(vec!["Journal".into()]);
    let context = vault.context().await.unwrap();

    assert_eq!(
        context,
        "From \"New\":\nnewer entry\n\n---\n\nFrom \"Old\":\nolder entry"
    );
}

#[tokio::test]
async fn test_context_truncates_long_notes_and_caps_file_count() {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("Journal");
    write_note(&journal, "Long.md", &"é".repeat(600), 0);
    for i in 0..12 {
        write_note(&journal, &format!("Day {i}.md"), "entry", 100 + i);
    }

    let vault = FsVault::new(dir.path()).with_context_folders(vec!["Journal".into()]);
    let context = vault.context().await.unwrap();

    let first = context.split("\n\n---\n\n").next().unwrap();
    assert_eq!(first, format!("From \"Long\":\n{}...", "é".repeat(500)));
    assert_eq!(context.matches("From \"").count(), 10);
    assert!(!context.contains("Day 11"));
}

#[tokio::test]
async fn test_note_with_invalid_utf8_does_not_drop_context() {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("Journal");
    write_note(&journal, "Good.md", "fine entry", 10);
    fs::write(journal.join("Latin1.md"), b"caf\xe9").unwrap();

    let vault = FsVault::new(dir.path()).with_context_folders(vec!["Journal".into()]);
    let context = vault.context().await.unwrap();

    assert!(context.contains("From \"Good\":\nfine entry"));
    assert!(context.contains("From \"Latin1\":\ncaf\u{FFFD}"));
}

#[tokio::test]
async fn test_missing_context_folder_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_note(&dir.path().join("Journal"), "Only.md", "entry", 0);

    let vault = FsVault::new(dir.path())
        .with_context_folders(vec!["Nowhere".into(), "Journal".into()]);
    assert_eq!(vault.context().await.unwrap(), "From \"Only\":\nentry");
}

#[tokio::test]
async fn test_link_existence_matches_note_titles_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    write_note(&dir.path().join("Topics"), "Fear of Change.md", "", 0);

    let vault = FsVault::new(dir.path());
    assert!(vault.exists("[[fear of change]]").await);
    assert!(vault.exists("[[Fear of Change]]").await);
    assert!(!vault.exists("[[Courage]]").await);
    assert!(!vault.exists("Fear of Change").await);
}

#[tokio::test]
async fn test_save_writes_dated_note_and_suffixes_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let vault = FsVault::from_settings(&VaultSettings {
        root: dir.path().to_path_buf(),
        save_folder: "Reflections".into(),
        context_folders: Vec::new(),
    });

    let first = vault.save(&draft()).await.unwrap();
    let second = vault.save(&draft()).await.unwrap();
    let third = vault.save(&draft()).await.unwrap();

    let folder = dir.path().join("Reflections");
    assert_eq!(first, folder.join("2024-03-09-introspection.md"));
    assert_eq!(second, folder.join("2024-03-09-introspection-1.md"));
    assert_eq!(third, folder.join("2024-03-09-introspection-2.md"));

    let content = fs::read_to_string(&first).unwrap();
    assert_eq!(content, render_note(&draft()));
}

#[test]
fn test_rendered_note_has_all_sections() {
    let note = render_note(&draft());

    assert!(note.starts_with("# Introspection - 2024-03-09\n"));
    assert!(note.contains("## Opening\n\nQuiet morning light\nA question waits by the door\nWhat do you carry\n\n## Insights"));
    assert!(note.contains("## Insights\n\n- Waiting feels safer than choosing\n"));
    assert!(note.contains("## Related Notes\n\n- [[Fear]]\n- [[Decisions]]\n"));
    assert!(note.contains("<summary>Full Conversation (Warm Therapist)</summary>"));
    assert!(note.contains("**You**: I keep postponing the move"));
    assert!(note.contains("**Introspector**: What would choosing cost you?"));
}
