use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::deriver::derive_notes;
use crate::core::renderer::render_card;
use crate::core::{ConfigProvider, Pipeline, Song, Storage, TransformResult};
use crate::domain::model::{AmbiguityReport, AmbiguousCard, RenderedCard};
use crate::utils::error::{DeckError, Result};

/// Written next to the deck whenever any card needed an ambiguity rank.
pub const AMBIGUITY_REPORT_FILE: &str = "ambiguous.json";

pub struct LyricsPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> LyricsPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for LyricsPipeline<S, C> {
    fn extract(&self) -> Result<Vec<Song>> {
        let dir = Path::new(self.config.source_dir());

        let paths = match self.storage.list_dir(dir) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!("❌ Cannot read source directory {}: {}", dir.display(), e);
                return Err(e);
            }
        };

        let mut songs = Vec::new();
        let mut skipped = 0usize;
        for path in paths {
            if !has_recognized_extension(&path, self.config.extensions()) {
                tracing::debug!("Ignoring {} (extension not configured)", path.display());
                continue;
            }

            let Some(title) = path.file_stem().and_then(|stem| stem.to_str()) else {
                tracing::warn!("⚠️ Skipping {}: file name is not valid UTF-8", path.display());
                continue;
            };

            let content = match self.storage.read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::error!("❌ Cannot read {}: {}", path.display(), e);
                    return Err(e);
                }
            };

            match Song::from_content(title, &content) {
                Ok(song) => {
                    tracing::debug!("Read '{}' ({} line(s))", song.title, song.lines.len());
                    songs.push(song);
                }
                Err(e @ DeckError::EmptySongError { .. }) => {
                    tracing::warn!("⚠️ {}; skipping", e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if skipped > 0 {
            tracing::info!("⚠️ Skipped {} file(s) without usable lines", skipped);
        }

        if songs.is_empty() {
            return Err(DeckError::ProcessingError {
                message: format!(
                    "no songs with extension(s) {} found in {}",
                    self.config.extensions().join(", "),
                    dir.display()
                ),
            });
        }

        Ok(songs)
    }

    fn transform(&self, songs: Vec<Song>) -> Result<TransformResult> {
        let songs_processed = songs.len();

        // 每首歌獨立推導，結果保持輸入順序
        let per_song: Vec<(Vec<RenderedCard>, Vec<AmbiguousCard>)> = songs
            .par_iter()
            .map(derive_song_cards)
            .collect::<Result<Vec<_>>>()?;

        let mut cards = Vec::new();
        let mut ambiguous = Vec::new();
        for (song_cards, song_ambiguous) in per_song {
            cards.extend(song_cards);
            ambiguous.extend(song_ambiguous);
        }

        Ok(TransformResult {
            cards,
            ambiguous,
            songs_processed,
        })
    }

    fn load(&self, result: TransformResult) -> Result<String> {
        let out_dir = PathBuf::from(self.config.output_path());
        let deck_path = out_dir.join(self.config.output_file());

        let csv_data = {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for card in &result.cards {
                writer.write_record([card.front.as_str(), card.back.as_str()])?;
            }
            writer
                .into_inner()
                .map_err(|e| DeckError::ProcessingError {
                    message: format!("flushing CSV buffer failed: {}", e),
                })?
        };

        tracing::debug!(
            "Writing {} card(s) ({} bytes) to {}",
            result.cards.len(),
            csv_data.len(),
            deck_path.display()
        );
        self.storage.write_atomic(&deck_path, &csv_data)?;

        if !result.ambiguous.is_empty() {
            let report = AmbiguityReport {
                generated_at: chrono::Utc::now().to_rfc3339(),
                cards: result.ambiguous,
            };
            let json_data = serde_json::to_string_pretty(&report)?;
            let report_path = out_dir.join(AMBIGUITY_REPORT_FILE);
            self.storage.write_atomic(&report_path, json_data.as_bytes())?;
            tracing::info!(
                "📝 {} ambiguous card(s) listed in {}",
                report.cards.len(),
                report_path.display()
            );
        }

        Ok(deck_path.display().to_string())
    }
}

/// Cards plus ambiguity records for one song. Free function so rayon workers
/// borrow nothing but the song itself.
fn derive_song_cards(song: &Song) -> Result<(Vec<RenderedCard>, Vec<AmbiguousCard>)> {
    let augmented = song.augmented_lines();
    let notes = match derive_notes(&augmented) {
        Ok(notes) => notes,
        Err(e) => {
            tracing::error!("❌ Note derivation failed for '{}': {}", song.title, e);
            return Err(e);
        }
    };

    let mut cards = Vec::with_capacity(notes.len());
    let mut ambiguous = Vec::new();
    for note in &notes {
        cards.push(render_card(&song.title, note));
        if let Some(mark) = &note.disambiguation {
            ambiguous.push(AmbiguousCard {
                song: song.title.clone(),
                prompt: note.prompt.clone(),
                answer: note.answer.clone(),
                rank: mark.rank,
                of: mark.of,
            });
        }
    }

    tracing::debug!("Derived {} card(s) for '{}'", cards.len(), song.title);
    Ok((cards, ambiguous))
}

fn has_recognized_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Filesystem-backed storage used by the CLI binary.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        // 先寫臨時檔再改名，不留下寫到一半的輸出
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(data)?;
        temp.persist(path).map_err(|e| DeckError::IoError(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::model::START_MARKER;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self::default()
        }

        fn with_files(entries: &[(&str, &str)]) -> Self {
            let storage = Self::new();
            {
                let mut files = storage.files.lock().unwrap();
                for (path, content) in entries {
                    files.insert(PathBuf::from(path), content.as_bytes().to_vec());
                }
            }
            storage
        }

        fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().unwrap();
            files.get(Path::new(path)).cloned()
        }
    }

    impl Storage for MockStorage {
        fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
            let files = self.files.lock().unwrap();
            let mut paths: Vec<PathBuf> = files
                .keys()
                .filter(|path| path.parent() == Some(dir))
                .cloned()
                .collect();
            paths.sort();
            Ok(paths)
        }

        fn read_to_string(&self, path: &Path) -> Result<String> {
            let files = self.files.lock().unwrap();
            let data = files.get(path).cloned().ok_or_else(|| {
                DeckError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                ))
            })?;
            String::from_utf8(data).map_err(|e| DeckError::ProcessingError {
                message: format!("{} is not valid UTF-8: {}", path.display(), e),
            })
        }

        fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().unwrap();
            files.insert(path.to_path_buf(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source_dir: String,
        output_path: String,
        output_file: String,
        extensions: Vec<String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                source_dir: "songs".to_string(),
                output_path: "out".to_string(),
                output_file: "deck.csv".to_string(),
                extensions: vec!["txt".to_string()],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source_dir(&self) -> &str {
            &self.source_dir
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_file(&self) -> &str {
            &self.output_file
        }

        fn extensions(&self) -> &[String] {
            &self.extensions
        }
    }

    fn read_rows(bytes: &[u8]) -> Vec<(String, String)> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes);
        reader
            .records()
            .map(|record| {
                let record = record.unwrap();
                (record[0].to_string(), record[1].to_string())
            })
            .collect()
    }

    #[test]
    fn test_extract_reads_songs_in_file_name_order() {
        let storage = MockStorage::with_files(&[
            ("songs/Second Song.txt", "some line"),
            ("songs/First Song.txt", "another line"),
        ]);
        let pipeline = LyricsPipeline::new(storage, MockConfig::new());

        let songs = pipeline.extract().unwrap();

        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].title, "First Song");
        assert_eq!(songs[1].title, "Second Song");
    }

    #[test]
    fn test_extract_skips_files_without_usable_lines() {
        let storage = MockStorage::with_files(&[
            ("songs/Empty.txt", "   \n\n\t\n"),
            ("songs/Real.txt", "a line worth keeping"),
        ]);
        let pipeline = LyricsPipeline::new(storage, MockConfig::new());

        let songs = pipeline.extract().unwrap();

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Real");
    }

    #[test]
    fn test_extract_ignores_unconfigured_extensions() {
        let storage = MockStorage::with_files(&[
            ("songs/README.md", "not a song"),
            ("songs/Song.txt", "a lyric line"),
        ]);
        let pipeline = LyricsPipeline::new(storage, MockConfig::new());

        let songs = pipeline.extract().unwrap();

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Song");
    }

    #[test]
    fn test_extract_matches_extensions_case_insensitively() {
        let storage = MockStorage::with_files(&[("songs/Loud.TXT", "a lyric line")]);
        let pipeline = LyricsPipeline::new(storage, MockConfig::new());

        let songs = pipeline.extract().unwrap();

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Loud");
    }

    #[test]
    fn test_extract_fails_when_nothing_matches() {
        let storage = MockStorage::with_files(&[("songs/README.md", "not a song")]);
        let pipeline = LyricsPipeline::new(storage, MockConfig::new());

        let result = pipeline.extract();

        assert!(matches!(result, Err(DeckError::ProcessingError { .. })));
    }

    #[test]
    fn test_transform_renders_cards_for_each_transition() {
        let storage = MockStorage::new();
        let pipeline = LyricsPipeline::new(storage, MockConfig::new());
        let songs = vec![Song {
            title: "Test".to_string(),
            lines: vec!["one".to_string(), "two".to_string()],
        }];

        let result = pipeline.transform(songs).unwrap();

        assert_eq!(result.songs_processed, 1);
        assert_eq!(result.cards.len(), 3);
        assert_eq!(
            result.cards[0].front,
            format!(
                "<span style=\"font-variant: small-caps\">Test</span><br>{}",
                START_MARKER
            )
        );
        assert_eq!(result.cards[0].back, "one");
        assert_eq!(result.cards[1].back, "two");
        assert_eq!(result.cards[2].back, "--END--");
        assert!(result.ambiguous.is_empty());
    }

    #[test]
    fn test_transform_keeps_song_order() {
        let storage = MockStorage::new();
        let pipeline = LyricsPipeline::new(storage, MockConfig::new());
        let songs = vec![
            Song {
                title: "Alpha".to_string(),
                lines: vec!["alpha line".to_string()],
            },
            Song {
                title: "Beta".to_string(),
                lines: vec!["beta line".to_string()],
            },
        ];

        let result = pipeline.transform(songs).unwrap();

        assert_eq!(result.cards.len(), 4);
        assert_eq!(result.cards[0].back, "alpha line");
        assert_eq!(result.cards[2].back, "beta line");
        assert!(result.cards[0].front.contains("Alpha"));
        assert!(result.cards[2].front.contains("Beta"));
    }

    #[test]
    fn test_load_writes_deck_csv() {
        let storage = MockStorage::new();
        let pipeline = LyricsPipeline::new(storage.clone(), MockConfig::new());

        let cards = vec![
            RenderedCard {
                front: "front, with comma".to_string(),
                back: "back with \"quotes\"".to_string(),
            },
            RenderedCard {
                front: "plain front".to_string(),
                back: "plain back".to_string(),
            },
        ];
        let result = TransformResult {
            cards: cards.clone(),
            ambiguous: vec![],
            songs_processed: 1,
        };

        let output_path = pipeline.load(result).unwrap();

        assert_eq!(output_path, "out/deck.csv");
        let bytes = storage.get_file("out/deck.csv").unwrap();
        let rows = read_rows(&bytes);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (cards[0].front.clone(), cards[0].back.clone()));
        assert_eq!(rows[1], (cards[1].front.clone(), cards[1].back.clone()));
    }

    #[test]
    fn test_load_skips_ambiguity_report_when_none() {
        let storage = MockStorage::new();
        let pipeline = LyricsPipeline::new(storage.clone(), MockConfig::new());

        let result = TransformResult {
            cards: vec![RenderedCard {
                front: "f".to_string(),
                back: "b".to_string(),
            }],
            ambiguous: vec![],
            songs_processed: 1,
        };

        pipeline.load(result).unwrap();

        assert!(storage.get_file("out/deck.csv").is_some());
        assert!(storage.get_file("out/ambiguous.json").is_none());
    }

    #[test]
    fn test_load_writes_ambiguity_report_when_flagged() {
        let storage = MockStorage::new();
        let pipeline = LyricsPipeline::new(storage.clone(), MockConfig::new());

        let result = TransformResult {
            cards: vec![RenderedCard {
                front: "f".to_string(),
                back: "b".to_string(),
            }],
            ambiguous: vec![AmbiguousCard {
                song: "Repeats".to_string(),
                prompt: vec!["chorus line".to_string()],
                answer: "second verse".to_string(),
                rank: 1,
                of: 2,
            }],
            songs_processed: 1,
        };

        pipeline.load(result).unwrap();

        let bytes = storage.get_file("out/ambiguous.json").unwrap();
        let report: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(report["generated_at"].is_string());
        assert_eq!(report["cards"][0]["song"], "Repeats");
        assert_eq!(report["cards"][0]["rank"], 1);
        assert_eq!(report["cards"][0]["of"], 2);
    }

    #[test]
    fn test_pipeline_end_to_end_with_mock_storage() {
        let storage = MockStorage::with_files(&[
            ("songs/Couplet.txt", "A\nB\nA\nB\n"),
            ("songs/Single.txt", "only line\n"),
        ]);
        let pipeline = LyricsPipeline::new(storage.clone(), MockConfig::new());

        let songs = pipeline.extract().unwrap();
        let result = pipeline.transform(songs).unwrap();
        let output_path = pipeline.load(result).unwrap();

        assert_eq!(output_path, "out/deck.csv");
        let rows = read_rows(&storage.get_file("out/deck.csv").unwrap());

        // Couplet contributes four cards (one duplicate collapses), the
        // single-line song two.
        assert_eq!(rows.len(), 6);
        assert!(rows[0].0.contains("Couplet"));
        assert_eq!(rows[0].1, "A");
        assert!(rows[4].0.contains("Single"));
        assert_eq!(rows[4].1, "only line");
    }
}
