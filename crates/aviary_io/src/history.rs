use anyhow::Result;
use aviary_data::{GenerationSummary, LiveEvent};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use uuid::Uuid;

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Append-only JSON-lines log of training events, written to `{dir}/live.jsonl`.
pub struct HistoryLogger {
    live_file: Option<BufWriter<File>>,
    log_dir: String,
}

impl HistoryLogger {
    pub fn new_at(dir: &str) -> Result<Self> {
        if !std::path::Path::new(dir).exists() {
            std::fs::create_dir_all(dir)?;
        }
        let file_path = format!("{}/live.jsonl", dir);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        Ok(Self {
            live_file: Some(BufWriter::new(file)),
            log_dir: dir.to_string(),
        })
    }

    /// Logger that drops every event.
    pub fn new_dummy() -> Self {
        Self {
            live_file: None,
            log_dir: String::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.live_file.is_some()
    }

    pub fn log_event(&mut self, event: LiveEvent) -> Result<()> {
        if let Some(ref mut file) = self.live_file {
            let json = serde_json::to_string(&event)?;
            writeln!(file, "{}", json)?;
            file.flush()?;
        }
        Ok(())
    }

    pub fn generation_completed(
        &mut self,
        summary: GenerationSummary,
        highscore: f64,
    ) -> Result<()> {
        self.log_event(LiveEvent::GenerationCompleted {
            summary,
            highscore,
            timestamp: timestamp(),
        })
    }

    pub fn reseeded(&mut self, population: usize) -> Result<()> {
        self.log_event(LiveEvent::Reseeded {
            population,
            timestamp: timestamp(),
        })
    }

    pub fn formation_arrived(&mut self, drone: Uuid, tick: u64) -> Result<()> {
        self.log_event(LiveEvent::FormationArrived {
            drone,
            tick,
            timestamp: timestamp(),
        })
    }

    /// Reads back every parseable event. Malformed lines are skipped.
    pub fn read_events(&self) -> Result<Vec<LiveEvent>> {
        if self.live_file.is_none() {
            return Ok(vec![]);
        }
        let file_path = format!("{}/live.jsonl", self.log_dir);
        let file = match File::open(file_path) {
            Ok(f) => f,
            Err(_) => return Ok(vec![]),
        };
        let reader = BufReader::new(file);
        let events = reader
            .lines()
            .map_while(std::result::Result::ok)
            .filter_map(|l| serde_json::from_str::<LiveEvent>(&l).ok())
            .collect();
        Ok(events)
    }

    pub fn get_summaries(&self) -> Result<Vec<GenerationSummary>> {
        Ok(self
            .read_events()?
            .into_iter()
            .filter_map(|event| match event {
                LiveEvent::GenerationCompleted { summary, .. } => Some(summary),
                _ => None,
            })
            .collect())
    }
}
