//! A directory of markdown notes standing in for the engine's collaborators.

use crate::note::render_note;
use ignore::WalkBuilder;
use introspector_core::config::VaultSettings;
use introspector_core::constants::{limits, paths};
use introspector_core::{ContextProvider, LinkExistenceChecker, NoteDraft, NotePersister};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.+?)\]\]").expect("valid wiki-link regex"));

pub struct FsVault {
    root: PathBuf,
    save_folder: String,
    context_folders: Vec<String>,
    file_limit: usize,
    snippet_length: usize,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            save_folder: paths::DEFAULT_SAVE_FOLDER.to_string(),
            context_folders: Vec::new(),
            file_limit: limits::CONTEXT_FILE_LIMIT,
            snippet_length: limits::CONTEXT_SNIPPET_LENGTH,
        }
    }

    pub fn from_settings(settings: &VaultSettings) -> Self {
        Self::new(&settings.root)
            .with_save_folder(&settings.save_folder)
            .with_context_folders(settings.context_folders.clone())
    }

    pub fn with_save_folder(mut self, folder: impl Into<String>) -> Self {
        self.save_folder = folder.into();
        self
    }

    pub fn with_context_folders(mut self, folders: Vec<String>) -> Self {
        self.context_folders = folders;
        self
    }

    pub fn save_dir(&self) -> PathBuf {
        self.root.join(&self.save_folder)
    }

    fn markdown_files(&self, dir: &Path) -> Vec<PathBuf> {
        WalkBuilder::new(dir)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == paths::NOTE_EXTENSION))
            .collect()
    }

    /// Snippets of the most recently modified notes in the context folders.
    /// Notes that cannot be read are skipped; invalid UTF-8 is decoded lossily.
    pub async fn gather_context(&self) -> introspector_core::Result<String> {
        let candidates: Vec<PathBuf> = self
            .context_folders
            .iter()
            .map(|folder| self.root.join(folder))
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| self.markdown_files(&dir))
            .collect();

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::with_capacity(candidates.len());
        for path in candidates {
            if let Ok(modified) = tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
                files.push((modified, path));
            }
        }

        files.sort_by(|a, b| b.0.cmp(&a.0));
        files.dedup_by(|a, b| a.1 == b.1);
        files.truncate(self.file_limit);

        let mut parts = Vec::with_capacity(files.len());
        for (_, path) in &files {
            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable note");
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes);
            let title = path.file_stem().unwrap_or_default().to_string_lossy();
            let snippet: String = content.chars().take(self.snippet_length).collect();
            let ellipsis = if content.chars().count() > self.snippet_length {
                "..."
            } else {
                ""
            };
            parts.push(format!("From \"{title}\":\n{snippet}{ellipsis}"));
        }

        tracing::debug!(notes = parts.len(), "gathered context");
        Ok(parts.join("\n\n---\n\n"))
    }

    /// Whether a `[[Title]]` link names an existing note (case-insensitive).
    pub fn note_exists(&self, link: &str) -> bool {
        let Some(title) = WIKI_LINK.captures(link).and_then(|c| c.get(1)) else {
            return false;
        };
        let title = title.as_str().to_lowercase();

        self.markdown_files(&self.root).iter().any(|path| {
            path.file_stem()
                .is_some_and(|stem| stem.to_string_lossy().to_lowercase() == title)
        })
    }

    /// First free `<date>-introspection[-n].md` path in the save folder.
    async fn next_note_path(&self, date: &str) -> std::io::Result<PathBuf> {
        let dir = self.save_dir();
        let mut path = dir.join(format!("{date}-introspection.{}", paths::NOTE_EXTENSION));
        let mut counter = 1;
        while tokio::fs::try_exists(&path).await? {
            path = dir.join(format!(
                "{date}-introspection-{counter}.{}",
                paths::NOTE_EXTENSION
            ));
            counter += 1;
        }
        Ok(path)
    }

    pub async fn write_note(&self, draft: &NoteDraft) -> introspector_core::Result<PathBuf> {
        tokio::fs::create_dir_all(self.save_dir()).await?;
        let path = self.next_note_path(&draft.date()).await?;
        tokio::fs::write(&path, render_note(draft)).await?;
        tracing::info!(path = %path.display(), "note written");
        Ok(path)
    }
}

#[async_trait::async_trait]
impl ContextProvider for FsVault {
    async fn context(&self) -> introspector_core::Result<String> {
        self.gather_context().await
    }
}

#[async_trait::async_trait]
impl LinkExistenceChecker for FsVault {
    async fn exists(&self, candidate: &str) -> bool {
        self.note_exists(candidate)
    }
}

#[async_trait::async_trait]
impl NotePersister for FsVault {
    async fn save(&self, draft: &NoteDraft) -> introspector_core::Result<PathBuf> {
        self.write_note(draft).await
    }
}
